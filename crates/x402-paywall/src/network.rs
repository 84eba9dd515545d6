//! Supported payment networks.
//!
//! Each [`Network`] carries the USDC deployment the `exact` scheme pays in,
//! the EIP-712 domain of that token, and the facilitator used when none is
//! configured explicitly.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::error::X402Error;

/// Base mainnet USDC.
pub const BASE_USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// Base Sepolia testnet USDC.
pub const BASE_SEPOLIA_USDC: Address = address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "base-sepolia")]
    BaseSepolia,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::BaseSepolia => "base-sepolia",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Base => 8453,
            Network::BaseSepolia => 84532,
        }
    }

    pub fn usdc(&self) -> Address {
        match self {
            Network::Base => BASE_USDC,
            Network::BaseSepolia => BASE_SEPOLIA_USDC,
        }
    }

    /// EIP-712 domain `(name, version)` of the network's USDC contract.
    pub fn usdc_domain(&self) -> (&'static str, &'static str) {
        match self {
            Network::Base => ("USD Coin", "2"),
            Network::BaseSepolia => ("USDC", "2"),
        }
    }

    pub fn explorer_base(&self) -> &'static str {
        match self {
            Network::Base => "https://basescan.org",
            Network::BaseSepolia => "https://sepolia.basescan.org",
        }
    }

    /// Facilitator used when `FACILITATOR_URL` is not set.
    pub fn default_facilitator_url(&self) -> &'static str {
        match self {
            Network::Base => "https://open.x402.host",
            Network::BaseSepolia => "https://x402.org/facilitator",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "base" => Ok(Network::Base),
            "base-sepolia" => Ok(Network::BaseSepolia),
            other => Err(X402Error::ConfigError(format!(
                "unsupported network '{other}' (expected 'base' or 'base-sepolia')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_networks() {
        assert_eq!("base".parse::<Network>().unwrap(), Network::Base);
        assert_eq!(
            " base-sepolia ".parse::<Network>().unwrap(),
            Network::BaseSepolia
        );
    }

    #[test]
    fn test_parse_unknown_network_is_config_error() {
        let err = "ethereum".parse::<Network>().unwrap_err();
        assert!(matches!(err, X402Error::ConfigError(_)));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&Network::BaseSepolia).unwrap(),
            "\"base-sepolia\""
        );
        let n: Network = serde_json::from_str("\"base\"").unwrap();
        assert_eq!(n, Network::Base);
    }

    #[test]
    fn test_chain_ids() {
        assert_eq!(Network::Base.chain_id(), 8453);
        assert_eq!(Network::BaseSepolia.chain_id(), 84532);
    }

    #[test]
    fn test_default_facilitators() {
        assert_eq!(
            Network::Base.default_facilitator_url(),
            "https://open.x402.host"
        );
        assert_eq!(
            Network::BaseSepolia.default_facilitator_url(),
            "https://x402.org/facilitator"
        );
    }
}
