use alloy::primitives::Address;

use crate::network::Network;

/// Protocol version spoken by both sides.
pub const X402_VERSION: u32 = 1;

/// x402 scheme name for EIP-3009 USDC transfers.
pub const SCHEME_NAME: &str = "exact";

/// Request header carrying the base64-encoded payment payload.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Response header carrying the base64-encoded settlement receipt.
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// Header carrying the HMAC of facilitator request bodies.
pub const FACILITATOR_AUTH_HEADER: &str = "X-Facilitator-Auth";

/// USDC has 6 decimal places on every supported network.
pub const TOKEN_DECIMALS: u32 = 6;

/// Default `maxTimeoutSeconds` for a priced route.
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 60;

/// Runtime chain configuration, derived from a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub network: Network,
    pub chain_id: u64,
    pub scheme_name: String,
    pub default_token: Address,
    pub token_decimals: u32,
    pub explorer_base: String,
    pub eip712_domain_name: String,
    pub eip712_domain_version: String,
}

impl ChainConfig {
    pub fn for_network(network: Network) -> Self {
        let (name, version) = network.usdc_domain();
        Self {
            network,
            chain_id: network.chain_id(),
            scheme_name: SCHEME_NAME.to_string(),
            default_token: network.usdc(),
            token_decimals: TOKEN_DECIMALS,
            explorer_base: network.explorer_base().to_string(),
            eip712_domain_name: name.to_string(),
            eip712_domain_version: version.to_string(),
        }
    }

    /// Explorer link for a settlement transaction.
    pub fn tx_url(&self, transaction: &str) -> String {
        format!("{}/tx/{transaction}", self.explorer_base)
    }
}

impl Default for ChainConfig {
    /// Defaults to Base Sepolia.
    fn default() -> Self {
        Self::for_network(Network::BaseSepolia)
    }
}
