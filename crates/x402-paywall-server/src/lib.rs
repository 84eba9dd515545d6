//! x402 resource server: gates HTTP endpoints behind 402 payments.
//!
//! [`payment_gate`](middleware::payment_gate) is an actix-web `from_fn`
//! middleware. Requests to priced paths get a 402 with
//! [`PaymentRequirements`](x402::PaymentRequirements) until they carry an
//! `X-PAYMENT` header that the facilitator verifies and settles; only then
//! does the handler run.
//!
//! # Modules
//!
//! - [`config`]: server settings and route pricing ([`PaymentGateBuilder`](config::PaymentGateBuilder))
//! - [`middleware`]: the payment gate
//! - [`metrics`]: Prometheus counters for requests and payment attempts
//! - [`routes`]: demo resource, health and metrics handlers

pub mod config;
pub mod metrics;
pub mod middleware;
pub mod routes;

pub use config::{PaymentGate, PaymentGateBuilder, RouteConfig, ServerConfig, SECRET_KNOWLEDGE_PATH};
pub use middleware::{payment_gate, payment_required, require_payment, requirements_for_request};
