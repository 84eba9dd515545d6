//! x402 pay-per-request protocol.
//!
//! Implements HTTP 402 payment gating with EIP-3009 `TransferWithAuthorization`
//! signatures over USDC on Base and Base Sepolia (the `exact` scheme).
//!
//! # Three-party model
//!
//! - **Client** ([`SchemeClient`]) signs payment authorizations
//! - **Server** ([`SchemeServer`]) prices routes and answers 402 with requirements
//! - **Facilitator** ([`Facilitator`], remote via [`FacilitatorClient`]) verifies and settles
//!
//! # Headers
//!
//! The client sends its [`PaymentPayload`] in `X-PAYMENT`; the server answers a
//! paid request with a [`SettlementReceipt`] in `X-PAYMENT-RESPONSE`. Both are
//! base64-encoded JSON (see [`codec`]).
//!
//! ```
//! use x402::{decode_receipt, encode_receipt, SettlementReceipt};
//!
//! let receipt = SettlementReceipt {
//!     success: true,
//!     transaction: "0xabc".to_string(),
//!     network: "base-sepolia".to_string(),
//!     payer: None,
//!     pay_to: None,
//!     amount: Some("1000".to_string()),
//! };
//! let header = encode_receipt(&receipt).unwrap();
//! assert_eq!(decode_receipt(&header).unwrap(), receipt);
//! ```

// Core types and traits
pub mod codec;
pub mod constants;
pub mod error;
pub mod network;
pub mod payment;
pub mod response;
pub mod scheme;

// exact scheme on EVM
pub mod eip712;
pub mod scheme_server;

// Facilitator transport
pub mod facilitator_client;
pub mod hmac;
pub mod security;

use alloy::sol;

// EIP-3009 typed data signed by the payer.
// The sol! macro derives SolStruct which provides eip712_signing_hash().
sol! {
    #[derive(Debug)]
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
}

// Re-exports
pub use codec::{decode_payment, decode_receipt, encode_payment, encode_receipt};
pub use constants::*;
pub use error::X402Error;
pub use network::Network;
pub use payment::*;
pub use response::*;
pub use scheme::*;

pub use facilitator_client::FacilitatorClient;
pub use scheme_server::ExactSchemeServer;
