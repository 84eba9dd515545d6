//! EIP-712 typed-data hashing for EIP-3009 `TransferWithAuthorization`.
//!
//! - Building the token's EIP-712 domain ([`token_domain`])
//! - Computing signing hashes ([`signing_hash`])
//! - Recovering the signer of an authorization ([`recover_signer`])
//! - Generating cryptographically secure random nonces ([`random_nonce`])
//! - Encoding signatures to hex ([`encode_signature_hex`])

use alloy::primitives::{Address, FixedBytes, Signature, B256, U256};
use alloy::sol_types::SolStruct;

use crate::TransferWithAuthorization;
use crate::X402Error;

/// secp256k1 curve order N / 2. Signatures with s above this are malleable (EIP-2).
const SECP256K1_N_DIV_2: U256 = U256::from_limbs([
    0xDFE92F46681B20A0,
    0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF,
    0x7FFFFFFFFFFFFFFF,
]);

/// EIP-712 domain of an EIP-3009 token contract.
pub fn token_domain(
    name: &str,
    version: &str,
    chain_id: u64,
    token: Address,
) -> alloy::sol_types::Eip712Domain {
    alloy::sol_types::Eip712Domain {
        name: Some(std::borrow::Cow::Owned(name.to_string())),
        version: Some(std::borrow::Cow::Owned(version.to_string())),
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(token),
        salt: None,
    }
}

pub fn signing_hash(
    auth: &TransferWithAuthorization,
    domain: &alloy::sol_types::Eip712Domain,
) -> B256 {
    auth.eip712_signing_hash(domain)
}

/// Recover the address that signed `auth`. Rejects high-s signatures.
pub fn recover_signer(
    auth: &TransferWithAuthorization,
    domain: &alloy::sol_types::Eip712Domain,
    signature_bytes: &[u8],
) -> Result<Address, X402Error> {
    if signature_bytes.len() != 65 {
        return Err(X402Error::SignatureError(format!(
            "signature must be 65 bytes, got {}",
            signature_bytes.len()
        )));
    }

    let sig = Signature::from_raw(signature_bytes)
        .map_err(|e| X402Error::SignatureError(format!("invalid signature: {e}")))?;

    if sig.s() > SECP256K1_N_DIV_2 {
        return Err(X402Error::SignatureError(
            "high-s signature rejected (EIP-2 malleability)".to_string(),
        ));
    }

    sig.recover_address_from_prehash(&signing_hash(auth, domain))
        .map_err(|e| X402Error::SignatureError(format!("recovery failed: {e}")))
}

/// Random 32-byte EIP-3009 nonce from the OS CSPRNG.
pub fn random_nonce() -> FixedBytes<32> {
    let mut bytes = [0u8; 32];
    rand::fill(&mut bytes);
    FixedBytes::new(bytes)
}

/// Encode a Signature to a hex string with 0x prefix (65 bytes -> 0x + 130 hex).
pub fn encode_signature_hex(sig: &Signature) -> String {
    format!("0x{}", alloy::hex::encode(sig.as_bytes()))
}
