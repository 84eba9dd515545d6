use std::str::FromStr;

use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use x402::{
    eip712::{encode_signature_hex, random_nonce, signing_hash, token_domain},
    ExactEvmAuthorization, ExactEvmPayload, Network, PaymentPayload, PaymentRequirements,
    SchemeClient, TransferWithAuthorization, X402Error, SCHEME_NAME,
};

/// Backdating of `validAfter`, absorbing clock skew against the chain.
const VALID_AFTER_SKEW_SECS: u64 = 600;

/// Wallet for the `exact` scheme: signs EIP-3009 transfer authorizations
/// with a local private key.
///
/// Use this with [`X402Client`](crate::X402Client) to make paid API requests.
pub struct ExactEvmSchemeClient {
    signer: PrivateKeySigner,
}

impl ExactEvmSchemeClient {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Build the wallet from a hex private key, with or without `0x`.
    pub fn from_private_key(key: &str) -> Result<Self, X402Error> {
        let key = key.trim();
        if key.is_empty() {
            return Err(X402Error::ConfigError(
                "private key wallet requires PRIVATE_KEY".to_string(),
            ));
        }
        let key = if key.starts_with("0x") {
            key.to_string()
        } else {
            format!("0x{key}")
        };
        let signer = PrivateKeySigner::from_str(&key)
            .map_err(|e| X402Error::ConfigError(format!("invalid PRIVATE_KEY: {e}")))?;
        Ok(Self::new(signer))
    }

    pub fn address(&self) -> alloy::primitives::Address {
        self.signer.address()
    }
}

impl SchemeClient for ExactEvmSchemeClient {
    fn supports(&self, requirements: &PaymentRequirements) -> bool {
        requirements.scheme == SCHEME_NAME && requirements.network.parse::<Network>().is_ok()
    }

    async fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> Result<PaymentPayload, X402Error> {
        let network: Network = requirements.network.parse().map_err(|_| {
            X402Error::UnsupportedScheme(format!("network '{}'", requirements.network))
        })?;

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| X402Error::ConfigError(format!("system time error: {e}")))?
            .as_secs();
        let valid_after = now.saturating_sub(VALID_AFTER_SKEW_SECS);
        let valid_before = now.saturating_add(requirements.max_timeout_seconds);

        let value = requirements
            .max_amount_required
            .parse::<U256>()
            .map_err(|e| X402Error::ProtocolError(format!("invalid maxAmountRequired: {e}")))?;

        let nonce = random_nonce();
        let auth = TransferWithAuthorization {
            from: self.signer.address(),
            to: requirements.pay_to,
            value,
            validAfter: U256::from(valid_after),
            validBefore: U256::from(valid_before),
            nonce,
        };

        // The asset's own EIP-712 domain, as advertised by the server when present.
        let (default_name, default_version) = network.usdc_domain();
        let (name, version) = requirements
            .extra
            .as_ref()
            .map(|e| (e.name.as_str(), e.version.as_str()))
            .unwrap_or((default_name, default_version));
        let domain = token_domain(name, version, network.chain_id(), requirements.asset);

        let sig = self
            .signer
            .sign_hash_sync(&signing_hash(&auth, &domain))
            .map_err(|e| X402Error::SignatureError(format!("signing failed: {e}")))?;

        let payload = ExactEvmPayload {
            signature: encode_signature_hex(&sig),
            authorization: ExactEvmAuthorization {
                from: self.signer.address(),
                to: requirements.pay_to,
                value: requirements.max_amount_required.clone(),
                valid_after: valid_after.to_string(),
                valid_before: valid_before.to_string(),
                nonce,
            },
        };

        Ok(PaymentPayload {
            x402_version,
            scheme: SCHEME_NAME.to_string(),
            network: network.to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use x402::network::BASE_SEPOLIA_USDC;
    use x402::TokenExtra;

    fn requirements() -> PaymentRequirements {
        PaymentRequirements {
            scheme: SCHEME_NAME.to_string(),
            network: "base-sepolia".to_string(),
            price: "$0.001".to_string(),
            max_amount_required: "1000".to_string(),
            resource: "http://localhost:3000/super-secret-knowledge".to_string(),
            description: String::new(),
            mime_type: None,
            pay_to: Address::repeat_byte(0xc7),
            max_timeout_seconds: 300,
            asset: BASE_SEPOLIA_USDC,
            extra: Some(TokenExtra {
                name: "USDC".to_string(),
                version: "2".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_create_payment_payload_is_recoverable() {
        let signer = PrivateKeySigner::random();
        let client = ExactEvmSchemeClient::new(signer.clone());

        let payload = client
            .create_payment_payload(1, &requirements())
            .await
            .unwrap();

        assert_eq!(payload.x402_version, 1);
        assert_eq!(payload.scheme, "exact");
        assert_eq!(payload.network, "base-sepolia");

        let exact: ExactEvmPayload = serde_json::from_value(payload.payload).unwrap();
        assert_eq!(exact.authorization.from, signer.address());
        assert_eq!(exact.authorization.to, Address::repeat_byte(0xc7));
        assert_eq!(exact.authorization.value, "1000");
        assert_eq!(exact.signature.len(), 132);

        let valid_after: u64 = exact.authorization.valid_after.parse().unwrap();
        let valid_before: u64 = exact.authorization.valid_before.parse().unwrap();
        assert_eq!(valid_before - valid_after, 300 + VALID_AFTER_SKEW_SECS);

        let auth = TransferWithAuthorization {
            from: exact.authorization.from,
            to: exact.authorization.to,
            value: U256::from(1000u64),
            validAfter: U256::from(valid_after),
            validBefore: U256::from(valid_before),
            nonce: exact.authorization.nonce,
        };
        let domain = token_domain("USDC", "2", 84532, BASE_SEPOLIA_USDC);
        let sig_bytes = alloy::hex::decode(exact.signature.trim_start_matches("0x")).unwrap();
        let recovered = x402::eip712::recover_signer(&auth, &domain, &sig_bytes).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn test_each_payload_gets_a_fresh_nonce() {
        let client = ExactEvmSchemeClient::new(PrivateKeySigner::random());
        let a = client.create_payment_payload(1, &requirements()).await.unwrap();
        let b = client.create_payment_payload(1, &requirements()).await.unwrap();
        assert_ne!(
            a.payload["authorization"]["nonce"],
            b.payload["authorization"]["nonce"]
        );
    }

    #[tokio::test]
    async fn test_unknown_network_is_unsupported() {
        let client = ExactEvmSchemeClient::new(PrivateKeySigner::random());
        let mut req = requirements();
        req.network = "solana".to_string();
        assert!(!client.supports(&req));
        let err = client.create_payment_payload(1, &req).await.unwrap_err();
        assert!(matches!(err, X402Error::UnsupportedScheme(_)));
    }

    #[test]
    fn test_supports_exact_on_base_networks() {
        let client = ExactEvmSchemeClient::new(PrivateKeySigner::random());
        let mut req = requirements();
        assert!(client.supports(&req));
        req.network = "base".to_string();
        assert!(client.supports(&req));
        req.scheme = "upto".to_string();
        assert!(!client.supports(&req));
    }

    #[test]
    fn test_from_private_key_accepts_missing_prefix() {
        let signer = PrivateKeySigner::random();
        let hex = alloy::hex::encode(signer.to_bytes());
        let with_prefix = ExactEvmSchemeClient::from_private_key(&format!("0x{hex}")).unwrap();
        let without_prefix = ExactEvmSchemeClient::from_private_key(&hex).unwrap();
        assert_eq!(with_prefix.address(), signer.address());
        assert_eq!(without_prefix.address(), signer.address());
    }

    #[test]
    fn test_from_private_key_rejects_empty_and_invalid() {
        assert!(matches!(
            ExactEvmSchemeClient::from_private_key("  "),
            Err(X402Error::ConfigError(_))
        ));
        assert!(matches!(
            ExactEvmSchemeClient::from_private_key("0xnothex"),
            Err(X402Error::ConfigError(_))
        ));
    }
}
