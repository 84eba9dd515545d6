use std::time::Duration;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue, ACCESS_CONTROL_EXPOSE_HEADERS};
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};
use x402::{
    decode_payment, encode_receipt, Facilitator, PaymentPayload, PaymentRequiredBody,
    PaymentRequirements, SettleResponse, SettlementReceipt, X402Error, PAYMENT_HEADER,
    PAYMENT_RESPONSE_HEADER, X402_VERSION,
};

use crate::config::{PaymentGate, RouteConfig};
use crate::metrics::{PAYMENT_ATTEMPTS, REQUESTS};

pub const MISSING_PAYMENT: &str = "X-PAYMENT header is required";
pub const MALFORMED_PAYMENT: &str = "invalid or malformed payment header";
pub const NO_MATCHING_REQUIREMENTS: &str = "no matching payment requirements";

/// Outcome of verify + settle when the facilitator answered.
enum Verdict {
    Settled(SettleResponse),
    Rejected {
        reason: String,
        payer: Option<String>,
    },
}

/// Resolve the requirements for this request, filling in `resource` when the
/// route does not fix one.
pub fn requirements_for_request(
    req: &ServiceRequest,
    route: &RouteConfig,
    resource_base_url: Option<&str>,
) -> PaymentRequirements {
    let mut requirements = route.requirements.clone();
    if requirements.resource.is_empty() {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        requirements.resource = match resource_base_url {
            Some(base) => format!("{base}{path}"),
            None => {
                let info = req.connection_info();
                format!("{}://{}{}", info.scheme(), info.host(), path)
            }
        };
    }
    requirements
}

/// Build the 402 response offering `requirements`.
pub fn payment_required(
    requirements: &PaymentRequirements,
    error: &str,
    payer: Option<String>,
) -> HttpResponse {
    let mut body = PaymentRequiredBody::new(X402_VERSION, error, requirements.clone());
    body.payer = payer;
    HttpResponse::PaymentRequired().json(body)
}

fn decode_header(header: &HeaderValue) -> Result<PaymentPayload, X402Error> {
    let value = header
        .to_str()
        .map_err(|e| X402Error::ProtocolError(format!("non-ASCII payment header: {e}")))?;
    let payload = decode_payment(value)?;
    if payload.x402_version != X402_VERSION {
        return Err(X402Error::ProtocolError(format!(
            "unsupported x402Version {}",
            payload.x402_version
        )));
    }
    Ok(payload)
}

async fn verify_and_settle<F: Facilitator>(
    facilitator: &F,
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
) -> Result<Verdict, X402Error> {
    let verified = facilitator.verify(payload, requirements).await?;
    if !verified.is_valid {
        return Ok(Verdict::Rejected {
            reason: verified
                .invalid_reason
                .unwrap_or_else(|| "payment verification failed".to_string()),
            payer: verified.payer,
        });
    }

    let settled = facilitator.settle(payload, requirements).await?;
    if !settled.success {
        return Ok(Verdict::Rejected {
            reason: settled
                .error_reason
                .unwrap_or_else(|| "payment settlement failed".to_string()),
            payer: settled.payer.or(verified.payer),
        });
    }
    Ok(Verdict::Settled(settled))
}

/// Checks the payment header, verifies and settles through the facilitator.
/// Returns the receipt on success, or the response to send instead of running the handler.
pub async fn require_payment<F: Facilitator>(
    facilitator: &F,
    header: Option<&HeaderValue>,
    requirements: &PaymentRequirements,
    endpoint: &str,
) -> Result<SettlementReceipt, HttpResponse> {
    let Some(header) = header else {
        REQUESTS.with_label_values(&[endpoint, "402"]).inc();
        return Err(payment_required(requirements, MISSING_PAYMENT, None));
    };

    let payload = match decode_header(header) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "invalid payment header");
            PAYMENT_ATTEMPTS.with_label_values(&["malformed"]).inc();
            REQUESTS.with_label_values(&[endpoint, "402"]).inc();
            return Err(payment_required(requirements, MALFORMED_PAYMENT, None));
        }
    };

    if payload.scheme != requirements.scheme || payload.network != requirements.network {
        tracing::warn!(
            scheme = %payload.scheme,
            network = %payload.network,
            "payment does not match route requirements"
        );
        PAYMENT_ATTEMPTS.with_label_values(&["mismatch"]).inc();
        REQUESTS.with_label_values(&[endpoint, "402"]).inc();
        return Err(payment_required(requirements, NO_MATCHING_REQUIREMENTS, None));
    }

    tracing::info!(
        network = %payload.network,
        payer = payload.payload["authorization"]["from"].as_str().unwrap_or("unknown"),
        "payment attempt"
    );

    let limit = Duration::from_secs(requirements.max_timeout_seconds);
    let outcome = tokio::time::timeout(
        limit,
        verify_and_settle(facilitator, &payload, requirements),
    )
    .await;

    match outcome {
        Ok(Ok(Verdict::Settled(settled))) => {
            PAYMENT_ATTEMPTS.with_label_values(&["success"]).inc();
            tracing::info!(
                tx = settled.transaction.as_deref().unwrap_or("unknown"),
                network = %settled.network,
                "payment settled"
            );
            Ok(SettlementReceipt::from_settlement(&settled, requirements))
        }
        Ok(Ok(Verdict::Rejected { reason, payer })) => {
            PAYMENT_ATTEMPTS.with_label_values(&["rejected"]).inc();
            REQUESTS.with_label_values(&[endpoint, "402"]).inc();
            tracing::warn!(payer = ?payer, reason = %reason, "payment rejected");
            Err(payment_required(requirements, &reason, payer))
        }
        Ok(Err(e)) => {
            PAYMENT_ATTEMPTS.with_label_values(&["error"]).inc();
            REQUESTS.with_label_values(&[endpoint, "500"]).inc();
            tracing::error!(error = %e, "facilitator communication error");
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "payment processing failed"
            })))
        }
        Err(_elapsed) => {
            PAYMENT_ATTEMPTS.with_label_values(&["timeout"]).inc();
            REQUESTS.with_label_values(&[endpoint, "504"]).inc();
            tracing::error!(
                timeout_secs = requirements.max_timeout_seconds,
                "payment processing timed out"
            );
            Err(HttpResponse::GatewayTimeout().json(serde_json::json!({
                "error": "payment processing timed out"
            })))
        }
    }
}

/// `X-PAYMENT-RESPONSE` name and encoded receipt value.
fn receipt_header(receipt: &SettlementReceipt) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(PAYMENT_RESPONSE_HEADER.as_bytes()).ok()?;
    let value = HeaderValue::from_str(&encode_receipt(receipt).ok()?).ok()?;
    Some((name, value))
}

/// Payment gate for `actix_web::middleware::from_fn`.
///
/// Needs `web::Data<PaymentGate<F>>` registered as app data. Paths without a
/// price pass straight through; priced paths only reach the handler after the
/// payment has settled.
///
/// ```ignore
/// App::new()
///     .app_data(gate.clone())
///     .wrap(from_fn(payment_gate::<FacilitatorClient, _>))
/// ```
pub async fn payment_gate<F, B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error>
where
    F: Facilitator + 'static,
    B: MessageBody + 'static,
{
    let Some(gate) = req.app_data::<web::Data<PaymentGate<F>>>().cloned() else {
        tracing::error!("payment gate installed without PaymentGate app data");
        return Ok(req.into_response(HttpResponse::InternalServerError().json(
            serde_json::json!({ "error": "payment gate misconfigured" }),
        )));
    };

    // Percent-decoded path, the same one the router matches handlers against.
    let path = req.match_info().as_str().to_string();
    let Some(route) = gate.route(req.method().as_str(), &path) else {
        return Ok(next.call(req).await?.map_into_boxed_body());
    };

    let requirements = requirements_for_request(&req, route, gate.resource_base_url());
    let header = req.headers().get(PAYMENT_HEADER).cloned();

    let receipt =
        match require_payment(gate.facilitator(), header.as_ref(), &requirements, &path).await {
            Ok(receipt) => receipt,
            Err(resp) => return Ok(req.into_response(resp)),
        };

    let Some((name, encoded)) = receipt_header(&receipt) else {
        tracing::error!(tx = %receipt.transaction, "failed to encode settlement receipt");
        return Ok(req.into_response(HttpResponse::InternalServerError().json(
            serde_json::json!({ "error": "payment processing failed" }),
        )));
    };

    let mut res = next.call(req).await?.map_into_boxed_body();
    REQUESTS
        .with_label_values(&[path.as_str(), res.status().as_str()])
        .inc();

    let headers = res.headers_mut();
    headers.insert(name, encoded);
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(PAYMENT_RESPONSE_HEADER),
    );
    Ok(res)
}
