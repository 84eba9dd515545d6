//! In-process facilitator for server tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use x402::eip712::{recover_signer, token_domain};
use x402::{
    ExactEvmPayload, Facilitator, Network, PaymentPayload, PaymentRequirements, SettleResponse,
    TransferWithAuthorization, VerifyResponse, X402Error,
};

pub const PAY_TO: Address = alloy::primitives::address!("0xC755328409dDcE7703646C2f26ED42B8Fe2C87D0");
pub const TX_HASH: &str = "0x5d5c7fbbe1a1e8fdd2f7c0b1d0e5f0a7a3b1b2c3d4e5f60718293a4b5c6d7e8f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Accept any payload.
    Accept,
    /// Recover the EIP-712 signer and check amount and recipient.
    CheckSignature,
    RejectVerify,
    RejectSettle,
    /// Transport failure on verify.
    Fail,
    /// Never answers within the route timeout.
    Hang,
}

#[derive(Clone)]
pub struct MockFacilitator {
    mode: Mode,
    pub verify_calls: Arc<AtomicUsize>,
    pub settle_calls: Arc<AtomicUsize>,
}

impl MockFacilitator {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            verify_calls: Arc::new(AtomicUsize::new(0)),
            settle_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn verifies(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn settles(&self) -> usize {
        self.settle_calls.load(Ordering::SeqCst)
    }
}

fn check_exact_payload(
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
) -> Result<String, String> {
    let exact: ExactEvmPayload =
        serde_json::from_value(payload.payload.clone()).map_err(|_| "invalid_payload")?;
    let auth = &exact.authorization;

    let value: U256 = auth.value.parse().map_err(|_| "invalid_payload")?;
    let required: U256 = requirements
        .max_amount_required
        .parse()
        .map_err(|_| "invalid_payload")?;
    if value < required {
        return Err("insufficient_amount".to_string());
    }
    if auth.to != requirements.pay_to {
        return Err("invalid_recipient".to_string());
    }

    let network: Network = requirements.network.parse().map_err(|_| "invalid_network")?;
    let extra = requirements.extra.clone().ok_or("missing_domain")?;
    let domain = token_domain(&extra.name, &extra.version, network.chain_id(), requirements.asset);
    let message = TransferWithAuthorization {
        from: auth.from,
        to: auth.to,
        value,
        validAfter: auth.valid_after.parse().map_err(|_| "invalid_payload")?,
        validBefore: auth.valid_before.parse().map_err(|_| "invalid_payload")?,
        nonce: auth.nonce,
    };
    let signature =
        alloy::hex::decode(exact.signature.trim_start_matches("0x")).map_err(|_| "invalid_signature")?;
    let signer = recover_signer(&message, &domain, &signature).map_err(|_| "invalid_signature")?;
    if signer != auth.from {
        return Err("invalid_signature".to_string());
    }
    Ok(format!("{signer:#x}"))
}

impl Facilitator for MockFacilitator {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::Accept | Mode::RejectSettle => Ok(VerifyResponse {
                is_valid: true,
                invalid_reason: None,
                payer: Some("0xpayer".to_string()),
            }),
            Mode::CheckSignature => Ok(match check_exact_payload(payload, requirements) {
                Ok(payer) => VerifyResponse {
                    is_valid: true,
                    invalid_reason: None,
                    payer: Some(payer),
                },
                Err(reason) => VerifyResponse {
                    is_valid: false,
                    invalid_reason: Some(reason),
                    payer: None,
                },
            }),
            Mode::RejectVerify => Ok(VerifyResponse {
                is_valid: false,
                invalid_reason: Some("insufficient_funds".to_string()),
                payer: Some("0xpayer".to_string()),
            }),
            Mode::Fail => Err(X402Error::TransportError(
                "facilitator unreachable".to_string(),
            )),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(X402Error::Timeout(30))
            }
        }
    }

    async fn settle(
        &self,
        _payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.settle_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::RejectSettle => Ok(SettleResponse {
                success: false,
                error_reason: Some("settlement_reverted".to_string()),
                payer: None,
                transaction: None,
                network: requirements.network.clone(),
            }),
            _ => Ok(SettleResponse {
                success: true,
                error_reason: None,
                payer: Some("0xpayer".to_string()),
                transaction: Some(TX_HASH.to_string()),
                network: requirements.network.clone(),
            }),
        }
    }
}
