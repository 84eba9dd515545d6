use alloy::primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_TIMEOUT_SECONDS;
use crate::network::Network;

/// Price attached to a gated route at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSpec {
    /// Human-readable price, e.g. `"$0.001"`.
    pub price: String,
    pub network: Network,
    pub description: String,
    /// Fixed resource URI. When `None` the URI of the incoming request is used.
    pub resource: Option<String>,
    pub max_timeout_seconds: u64,
    pub mime_type: Option<String>,
}

impl PriceSpec {
    pub fn new(price: &str, network: Network) -> Self {
        Self {
            price: price.to_string(),
            network,
            description: String::new(),
            resource: None,
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
            mime_type: Some("application/json".to_string()),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    pub fn max_timeout_seconds(mut self, seconds: u64) -> Self {
        self.max_timeout_seconds = seconds;
        self
    }

    pub fn mime_type(mut self, mime_type: Option<&str>) -> Self {
        self.mime_type = mime_type.map(String::from);
        self
    }
}

/// EIP-712 domain of the asset, needed by the client to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExtra {
    pub name: String,
    pub version: String,
}

/// A single entry in the `accepts` array of a 402 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    pub price: String,
    /// Amount in the asset's atomic units.
    pub max_amount_required: String,
    pub resource: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub pay_to: Address,
    pub max_timeout_seconds: u64,
    pub asset: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<TokenExtra>,
}

/// The 402 response body returned by the resource server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    #[serde(default)]
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl PaymentRequiredBody {
    /// Body offering exactly one set of requirements.
    pub fn new(x402_version: u32, error: &str, requirements: PaymentRequirements) -> Self {
        Self {
            x402_version,
            error: error.to_string(),
            resource: Some(requirements.resource.clone()),
            description: Some(requirements.description.clone()),
            mime_type: requirements.mime_type.clone(),
            accepts: vec![requirements],
            payer: None,
        }
    }
}

/// Wire-format payment payload, sent base64-encoded in the `X-PAYMENT` header.
///
/// `payload` is scheme-defined and opaque to the resource server, which only
/// forwards it to the facilitator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    pub payload: serde_json::Value,
}

/// EIP-3009 `TransferWithAuthorization` parameters, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub valid_after: String,
    pub valid_before: String,
    pub nonce: FixedBytes<32>,
}

/// `payload` of an `exact` scheme [`PaymentPayload`] on EVM networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactEvmPayload {
    pub signature: String,
    pub authorization: ExactEvmAuthorization,
}
