use std::time::Duration;

use x402::{
    decode_receipt, encode_payment, PaymentRequiredBody, SchemeClient, SettlementReceipt,
    X402Error, PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
};

/// Default spending cap per request: 0.10 USDC in atomic units.
pub const DEFAULT_MAX_PAYMENT: u128 = 100_000;

/// Timeout for the unpaid request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Added to `maxTimeoutSeconds` when waiting for the paid request, on top of
/// the time the server may spend settling.
pub const PAID_RETRY_GRACE: Duration = Duration::from_secs(5);

/// HTTP client that automatically pays 402 responses.
///
/// Wraps `reqwest::Client`. On a 402 response it parses the payment
/// requirements, has the [`SchemeClient`] sign an authorization, and retries
/// the request once with an `X-PAYMENT` header. A second 402 is surfaced as
/// [`X402Error::PaymentRejected`]; there is never a third request.
pub struct X402Client<S: SchemeClient> {
    http: reqwest::Client,
    scheme: S,
    max_payment: u128,
    request_timeout: Duration,
}

impl<S: SchemeClient> X402Client<S> {
    pub fn new(scheme: S) -> Result<Self, X402Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| X402Error::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(scheme, http))
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(scheme: S, http: reqwest::Client) -> Self {
        Self {
            http,
            scheme,
            max_payment: DEFAULT_MAX_PAYMENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Timeout for the unpaid request. The paid retry waits for the route's
    /// `maxTimeoutSeconds` plus [`PAID_RETRY_GRACE`] instead.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Refuse requirements asking for more than `max_payment` atomic units.
    pub fn with_max_payment(mut self, max_payment: u128) -> Self {
        self.max_payment = max_payment;
        self
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Make a request, automatically handling 402 payment responses.
    /// Returns the final response and the settlement receipt, if any.
    pub async fn fetch(
        &self,
        url: &str,
        method: reqwest::Method,
    ) -> Result<(reqwest::Response, Option<SettlementReceipt>), X402Error> {
        self.fetch_with_body(url, method, None).await
    }

    /// Make a request with an optional body, automatically handling 402 payment responses.
    pub async fn fetch_with_body(
        &self,
        url: &str,
        method: reqwest::Method,
        body: Option<Vec<u8>>,
    ) -> Result<(reqwest::Response, Option<SettlementReceipt>), X402Error> {
        let mut builder = self.http.request(method, url);
        if let Some(b) = body {
            builder = builder.body(b);
        }
        let request = builder
            .build()
            .map_err(|e| X402Error::ProtocolError(format!("invalid request: {e}")))?;
        self.execute(request).await
    }

    /// Send `request`, paying and retrying once if the server answers 402.
    pub async fn execute(
        &self,
        mut request: reqwest::Request,
    ) -> Result<(reqwest::Response, Option<SettlementReceipt>), X402Error> {
        let first_timeout = *request.timeout_mut().get_or_insert(self.request_timeout);

        // The retry needs its own copy; streaming bodies cannot be replayed.
        let mut retry = request.try_clone().ok_or_else(|| {
            X402Error::ProtocolError("request body cannot be cloned for a paid retry".to_string())
        })?;

        let url = request.url().clone();
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| transport_error("request failed", first_timeout, e))?;

        if resp.status() != reqwest::StatusCode::PAYMENT_REQUIRED {
            return Ok((resp, None));
        }

        let body_402: PaymentRequiredBody = resp
            .json()
            .await
            .map_err(|e| X402Error::ProtocolError(format!("failed to parse 402 body: {e}")))?;

        let requirements = body_402
            .accepts
            .iter()
            .find(|r| self.scheme.supports(r))
            .ok_or_else(|| {
                X402Error::UnsupportedScheme(format!(
                    "no supported scheme found in {:?}",
                    body_402
                        .accepts
                        .iter()
                        .map(|r| format!("{}/{}", r.scheme, r.network))
                        .collect::<Vec<_>>()
                ))
            })?;

        let required: u128 = requirements.max_amount_required.parse().map_err(|e| {
            X402Error::ProtocolError(format!(
                "invalid maxAmountRequired '{}': {e}",
                requirements.max_amount_required
            ))
        })?;
        if required > self.max_payment {
            return Err(X402Error::PaymentExceedsLimit {
                required: required.to_string(),
                limit: self.max_payment.to_string(),
            });
        }

        let payload = self
            .scheme
            .create_payment_payload(body_402.x402_version, requirements)
            .await?;
        let encoded = encode_payment(&payload)?;

        tracing::info!(
            %url,
            network = %requirements.network,
            amount = %requirements.max_amount_required,
            pay_to = %requirements.pay_to,
            "paying for resource"
        );

        let header_value = reqwest::header::HeaderValue::from_str(&encoded)
            .map_err(|e| X402Error::ProtocolError(format!("invalid payment header: {e}")))?;
        retry.headers_mut().insert(PAYMENT_HEADER, header_value);
        // The server may take up to maxTimeoutSeconds to verify and settle.
        let paid_timeout =
            Duration::from_secs(requirements.max_timeout_seconds) + PAID_RETRY_GRACE;
        *retry.timeout_mut() = Some(paid_timeout);

        let resp = self
            .http
            .execute(retry)
            .await
            .map_err(|e| transport_error("paid request failed", paid_timeout, e))?;

        if resp.status() == reqwest::StatusCode::PAYMENT_REQUIRED {
            let reason = resp
                .json::<PaymentRequiredBody>()
                .await
                .ok()
                .map(|b| b.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "payment was not accepted".to_string());
            tracing::warn!(%url, %reason, "payment rejected");
            return Err(X402Error::PaymentRejected(reason));
        }

        let receipt = match resp.headers().get(PAYMENT_RESPONSE_HEADER) {
            Some(value) => {
                let value = value.to_str().map_err(|e| {
                    X402Error::ProtocolError(format!("non-ASCII {PAYMENT_RESPONSE_HEADER}: {e}"))
                })?;
                Some(decode_receipt(value)?)
            }
            None => None,
        };

        Ok((resp, receipt))
    }
}

fn transport_error(context: &str, timeout: Duration, e: reqwest::Error) -> X402Error {
    if e.is_timeout() {
        tracing::warn!(timeout_secs = timeout.as_secs(), "{context}: timed out");
        X402Error::Timeout(timeout.as_secs())
    } else {
        X402Error::TransportError(format!("{context}: {e}"))
    }
}
