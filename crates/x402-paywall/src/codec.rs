//! Header encodings: `X-PAYMENT` and `X-PAYMENT-RESPONSE` both carry
//! base64 (standard alphabet, padded) JSON.

use base64::Engine;

use crate::error::X402Error;
use crate::payment::PaymentPayload;
use crate::response::SettlementReceipt;

/// Base64-encode a payment payload for the `X-PAYMENT` header.
pub fn encode_payment(payload: &PaymentPayload) -> Result<String, X402Error> {
    let json = serde_json::to_vec(payload)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode a payment payload from the `X-PAYMENT` header.
pub fn decode_payment(header_value: &str) -> Result<PaymentPayload, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(header_value.trim())
        .map_err(|e| X402Error::ProtocolError(format!("invalid base64 payment header: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::ProtocolError(format!("invalid JSON payment header: {e}")))
}

/// Base64-encode a settlement receipt for the `X-PAYMENT-RESPONSE` header.
pub fn encode_receipt(receipt: &SettlementReceipt) -> Result<String, X402Error> {
    let json = serde_json::to_vec(receipt)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode a settlement receipt from the `X-PAYMENT-RESPONSE` header.
pub fn decode_receipt(header_value: &str) -> Result<SettlementReceipt, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(header_value.trim())
        .map_err(|e| X402Error::ProtocolError(format!("invalid base64 receipt: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::ProtocolError(format!("invalid JSON receipt: {e}")))
}
