use x402::X402Error;

use crate::http_client::DEFAULT_MAX_PAYMENT;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/super-secret-knowledge";

/// Client settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub private_key: String,
    pub api_url: String,
    /// Spending cap per request, in atomic units.
    pub max_payment: u128,
}

impl ClientConfig {
    /// Load from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, X402Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Fails before anything touches the network.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, X402Error> {
        let private_key = lookup("PRIVATE_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                X402Error::ConfigError(
                    "private key wallet requires the PRIVATE_KEY environment variable".to_string(),
                )
            })?;

        let api_url = lookup("API_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&api_url)
            .map_err(|e| X402Error::ConfigError(format!("invalid API_URL '{api_url}': {e}")))?;

        let max_payment = match lookup("X402_MAX_PAYMENT") {
            Some(v) => v.trim().parse().map_err(|e| {
                X402Error::ConfigError(format!("invalid X402_MAX_PAYMENT '{v}': {e}"))
            })?,
            None => DEFAULT_MAX_PAYMENT,
        };

        Ok(Self {
            private_key,
            api_url,
            max_payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_private_key_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, X402Error::ConfigError(_)));
        assert!(err.to_string().contains("PRIVATE_KEY"));
    }

    #[test]
    fn test_blank_private_key_is_config_error() {
        assert!(ClientConfig::from_lookup(lookup(&[("PRIVATE_KEY", "   ")])).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[("PRIVATE_KEY", "abc")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_payment, DEFAULT_MAX_PAYMENT);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PRIVATE_KEY", "abc"),
            ("API_URL", "https://api.example.com/data"),
            ("X402_MAX_PAYMENT", "5000"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com/data");
        assert_eq!(config.max_payment, 5000);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(ClientConfig::from_lookup(lookup(&[
            ("PRIVATE_KEY", "abc"),
            ("API_URL", "not a url"),
        ]))
        .is_err());
        assert!(ClientConfig::from_lookup(lookup(&[
            ("PRIVATE_KEY", "abc"),
            ("X402_MAX_PAYMENT", "ten cents"),
        ]))
        .is_err());
    }
}
