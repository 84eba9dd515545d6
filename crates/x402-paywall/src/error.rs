use thiserror::Error;

/// Errors returned by x402 operations.
#[derive(Debug, Error)]
pub enum X402Error {
    /// Missing or invalid startup configuration (credentials, addresses, prices).
    #[error("config error: {0}")]
    ConfigError(String),

    /// The facilitator or resource server declined the payment.
    #[error("payment rejected: {0}")]
    PaymentRejected(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Malformed 402 body, payment header or settlement receipt.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("payment of {required} exceeds limit of {limit}")]
    PaymentExceedsLimit { required: String, limit: String },

    #[error("signature error: {0}")]
    SignatureError(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl X402Error {
    /// Whether the failure is worth retrying at the caller's discretion.
    pub fn is_retriable(&self) -> bool {
        matches!(self, X402Error::TransportError(_) | X402Error::Timeout(_))
    }
}
