//! HTTP client for a remote facilitator's `/verify` and `/settle` endpoints.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::constants::{FACILITATOR_AUTH_HEADER, X402_VERSION};
use crate::error::X402Error;
use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};
use crate::scheme::Facilitator;

/// Per-request bound on facilitator calls. The resource server applies its own
/// `maxTimeoutSeconds` bound on top of this.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Facilitator`] reached over HTTP.
#[derive(Clone)]
pub struct FacilitatorClient {
    http: reqwest::Client,
    url: String,
    hmac_secret: Option<Vec<u8>>,
}

impl fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("url", &self.url)
            .field("hmac_secret", &self.hmac_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FacilitatorClient {
    pub fn new(url: &str) -> Self {
        Self::with_http_client(url, reqwest::Client::new())
    }

    pub fn with_http_client(url: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            hmac_secret: None,
        }
    }

    /// Sign request bodies with HMAC-SHA256 under `secret`.
    pub fn with_hmac_secret(mut self, secret: Option<Vec<u8>>) -> Self {
        self.hmac_secret = secret;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<T, X402Error> {
        let url = format!("{}/{endpoint}", self.url);
        let body = serde_json::json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payload,
            "paymentRequirements": requirements,
        });
        let body_bytes = serde_json::to_vec(&body)?;

        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(DEFAULT_REQUEST_TIMEOUT);

        if let Some(secret) = &self.hmac_secret {
            let sig = crate::hmac::compute_hmac(secret, &body_bytes);
            request = request.header(FACILITATOR_AUTH_HEADER, sig);
        }

        let resp = request.body(body_bytes).send().await.map_err(|e| {
            if e.is_timeout() {
                X402Error::Timeout(DEFAULT_REQUEST_TIMEOUT.as_secs())
            } else {
                X402Error::TransportError(format!("facilitator request failed: {e}"))
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(X402Error::TransportError(
                "facilitator authentication failed".to_string(),
            ));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| X402Error::TransportError(format!("failed to read facilitator response: {e}")))?;

        // Facilitators report rejections as 4xx with a regular verify/settle body.
        match serde_json::from_str::<T>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => {
                tracing::error!(%status, %endpoint, body = %text, "facilitator returned non-success response");
                Err(X402Error::TransportError(format!(
                    "facilitator /{endpoint} returned {status}"
                )))
            }
            Err(e) => Err(X402Error::ProtocolError(format!(
                "facilitator /{endpoint} response parse failed: {e}"
            ))),
        }
    }
}

impl Facilitator for FacilitatorClient {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.post("verify", payload, requirements).await
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.post("settle", payload, requirements).await
    }
}
