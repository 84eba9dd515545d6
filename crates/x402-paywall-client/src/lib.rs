//! x402 client SDK for making paid API requests.
//!
//! Handles the HTTP 402 payment flow automatically: request -> 402 -> sign -> retry once.
//!
//! # Quick Example
//!
//! ```no_run
//! use x402_client::{ExactEvmSchemeClient, X402Client};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), x402_client::X402Error> {
//! let wallet = ExactEvmSchemeClient::from_private_key("0xYOUR_KEY")?;
//! let client = X402Client::new(wallet)?;
//!
//! let (resp, receipt) = client
//!     .fetch("http://localhost:3000/super-secret-knowledge", reqwest::Method::GET)
//!     .await?;
//!
//! if let Some(r) = receipt {
//!     println!("{} paid via tx {}", resp.status(), r.transaction);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod http_client;
mod scheme_client;

pub use config::ClientConfig;
pub use http_client::{
    X402Client, DEFAULT_MAX_PAYMENT, DEFAULT_REQUEST_TIMEOUT, PAID_RETRY_GRACE,
};
pub use scheme_client::ExactEvmSchemeClient;

// Re-export commonly needed types from core
pub use x402::{
    decode_receipt, PaymentPayload, PaymentRequiredBody, PaymentRequirements, SchemeClient,
    SettlementReceipt, X402Error, PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
};
