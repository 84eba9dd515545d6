use crate::{ChainConfig, SchemeServer, X402Error};
use alloy::primitives::Address;

/// Server-side `exact` scheme: turns dollar prices into USDC atomic amounts.
pub struct ExactSchemeServer {
    config: ChainConfig,
}

impl ExactSchemeServer {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }
}

impl Default for ExactSchemeServer {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl SchemeServer for ExactSchemeServer {
    fn parse_price(&self, price: &str) -> Result<(String, Address), X402Error> {
        let amount = parse_atomic_amount(price, self.config.token_decimals)?;
        Ok((amount.to_string(), self.config.default_token))
    }
}

/// Parse `"$0.001"`, `"0.01"` or `"$1"` into atomic units with `decimals` places.
///
/// Integer-only: no f64 anywhere. Digits beyond `decimals` are truncated.
pub fn parse_atomic_amount(price: &str, decimals: u32) -> Result<u64, X402Error> {
    let invalid = |why: &str| X402Error::ConfigError(format!("invalid price '{price}': {why}"));

    let cleaned = price.trim();
    let cleaned = cleaned.strip_prefix('$').unwrap_or(cleaned).trim();
    if cleaned.is_empty() {
        return Err(invalid("no numeric content"));
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid("unexpected characters"));
    }

    let (integer_part, fractional_part) = cleaned.split_once('.').unwrap_or((cleaned, ""));
    if fractional_part.contains('.') {
        return Err(invalid("more than one decimal point"));
    }
    if integer_part.is_empty() && fractional_part.is_empty() {
        return Err(invalid("no numeric content"));
    }

    let integer: u64 = if integer_part.is_empty() {
        0
    } else {
        integer_part
            .parse()
            .map_err(|e| invalid(&format!("integer part: {e}")))?
    };

    let decimals = decimals as usize;
    let frac_str = &fractional_part[..fractional_part.len().min(decimals)];
    let fractional: u64 = if frac_str.is_empty() {
        0
    } else {
        frac_str
            .parse()
            .map_err(|e| invalid(&format!("fractional part: {e}")))?
    };
    let scale = 10u64.pow((decimals - frac_str.len()) as u32);

    let amount = integer
        .checked_mul(10u64.pow(decimals as u32))
        .and_then(|i| fractional.checked_mul(scale).and_then(|f| i.checked_add(f)))
        .ok_or_else(|| invalid("overflow"))?;

    if amount == 0 {
        return Err(invalid("price must be greater than zero"));
    }
    Ok(amount)
}
