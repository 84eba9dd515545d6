//! Core trait definitions for the three-party payment model.
//!
//! - [`SchemeClient`]: client-side wallet, creates signed payment payloads
//! - [`Facilitator`]: verifies and settles payments (remote, see
//!   [`crate::facilitator_client::FacilitatorClient`])
//! - [`SchemeServer`]: server-side, parses prices into on-chain amounts

use crate::error::X402Error;
use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};
use alloy::primitives::Address;

/// Client-side scheme: creates signed payment payloads.
pub trait SchemeClient: Send + Sync {
    /// Whether this client can pay the given requirements (scheme and network).
    fn supports(&self, requirements: &PaymentRequirements) -> bool;

    /// Create a signed payment payload for the given requirements.
    fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<PaymentPayload, X402Error>> + Send;
}

/// Verifies and settles payment authorizations on behalf of a resource server.
///
/// A rejection is reported in the response (`is_valid == false`,
/// `success == false`); `Err` is reserved for transport and protocol failures.
pub trait Facilitator: Send + Sync {
    fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<VerifyResponse, X402Error>> + Send;

    fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<SettleResponse, X402Error>> + Send;
}

/// Server-side scheme: parses prices into on-chain amounts.
pub trait SchemeServer: Send + Sync {
    /// Parse a human-readable price string (e.g. "$0.001") into an atomic amount and asset.
    fn parse_price(&self, price: &str) -> Result<(String, Address), X402Error>;
}
