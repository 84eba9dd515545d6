use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::ChainConfig;
use crate::network::Network;
use crate::payment::PaymentRequirements;

/// Response from the facilitator's `/verify` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Response from the facilitator's `/settle` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Transaction hash, if settlement succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    pub network: String,
}

/// Settlement confirmation handed back to the client in `X-PAYMENT-RESPONSE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub success: bool,
    pub transaction: String,
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_to: Option<Address>,
    /// Settled amount in atomic units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl SettlementReceipt {
    /// Build the receipt for a successful settlement of `requirements`.
    pub fn from_settlement(settle: &SettleResponse, requirements: &PaymentRequirements) -> Self {
        Self {
            success: settle.success,
            transaction: settle.transaction.clone().unwrap_or_default(),
            network: settle.network.clone(),
            payer: settle.payer.clone(),
            pay_to: Some(requirements.pay_to),
            amount: Some(requirements.max_amount_required.clone()),
        }
    }

    /// Block explorer link for the settlement, if the network is known and a
    /// transaction was recorded.
    pub fn explorer_url(&self) -> Option<String> {
        if self.transaction.is_empty() {
            return None;
        }
        let network: Network = self.network.parse().ok()?;
        Some(ChainConfig::for_network(network).tx_url(&self.transaction))
    }
}
