use std::collections::HashMap;

use alloy::primitives::Address;
use x402::{
    ChainConfig, ExactSchemeServer, Facilitator, Network, PaymentRequirements, PriceSpec,
    SchemeServer, TokenExtra, X402Error,
};

/// Path of the demo resource.
pub const SECRET_KNOWLEDGE_PATH: &str = "/super-secret-knowledge";

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub network: Network,
    pub facilitator_url: String,
    pub pay_to: Address,
    /// Makes resource URIs fixed (`{base}{path}`) instead of following the request.
    pub resource_base_url: Option<String>,
    pub port: u16,
    pub hmac_secret: Option<Vec<u8>>,
    pub rate_limit_rpm: u64,
    pub allowed_origins: Vec<String>,
    pub metrics_token: Option<Vec<u8>>,
    pub public_metrics: bool,
}

impl ServerConfig {
    /// Load from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, X402Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, X402Error> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let network: Network = match get("NETWORK") {
            Some(n) => n.parse()?,
            None => Network::BaseSepolia,
        };

        let facilitator_url =
            get("FACILITATOR_URL").unwrap_or_else(|| network.default_facilitator_url().to_string());
        reqwest::Url::parse(&facilitator_url).map_err(|e| {
            X402Error::ConfigError(format!("invalid FACILITATOR_URL '{facilitator_url}': {e}"))
        })?;

        let pay_to = get("PAY_TO_ADDRESS")
            .ok_or_else(|| {
                X402Error::ConfigError(
                    "PAY_TO_ADDRESS is required (the wallet that receives payments)".to_string(),
                )
            })?
            .parse::<Address>()
            .map_err(|e| X402Error::ConfigError(format!("invalid PAY_TO_ADDRESS: {e}")))?;

        let resource_base_url = get("RESOURCE_BASE_URL");
        if let Some(base) = &resource_base_url {
            reqwest::Url::parse(base).map_err(|e| {
                X402Error::ConfigError(format!("invalid RESOURCE_BASE_URL '{base}': {e}"))
            })?;
        }

        let port = parse_or(get("PORT"), "PORT", 3000u16)?;
        let rate_limit_rpm = parse_or(get("RATE_LIMIT_RPM"), "RATE_LIMIT_RPM", 60u64)?;

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let public_metrics = get("X402_PUBLIC_METRICS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            network,
            facilitator_url,
            pay_to,
            resource_base_url,
            port,
            hmac_secret: get("FACILITATOR_SHARED_SECRET").map(String::into_bytes),
            rate_limit_rpm,
            allowed_origins,
            metrics_token: get("METRICS_TOKEN").map(String::into_bytes),
            public_metrics,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, X402Error>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .parse()
            .map_err(|e| X402Error::ConfigError(format!("invalid {key} '{v}': {e}"))),
        None => Ok(default),
    }
}

/// Payment configuration for a single route.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Upper-case HTTP method, e.g. `GET`.
    pub method: String,
    pub path: String,
    pub price: PriceSpec,
    /// Requirements derived from `price`. `resource` is empty when it follows the request.
    pub requirements: PaymentRequirements,
}

/// Read-only route table, keyed by `"{METHOD} {path}"`, plus the facilitator
/// that settles payments for it.
pub struct PaymentGate<F: Facilitator> {
    routes: HashMap<String, RouteConfig>,
    facilitator: F,
    resource_base_url: Option<String>,
}

impl<F: Facilitator> PaymentGate<F> {
    /// Gate with the demo route: `GET /super-secret-knowledge` at `$0.001`.
    pub fn new(config: &ServerConfig, facilitator: F) -> Result<Self, X402Error> {
        let mut price = PriceSpec::new("$0.001", config.network)
            .description("Access to the answer to life, the universe, and everything.")
            .max_timeout_seconds(300);
        if let Some(base) = &config.resource_base_url {
            price = price.resource(&format!(
                "{}{SECRET_KNOWLEDGE_PATH}",
                base.trim_end_matches('/')
            ));
        }

        PaymentGateBuilder::new(config.pay_to, facilitator)
            .resource_base_url(config.resource_base_url.as_deref())
            .route("GET", SECRET_KNOWLEDGE_PATH, price)
            .build()
    }

    /// Look up the payment config for a method and router path.
    pub fn route(&self, method: &str, path: &str) -> Option<&RouteConfig> {
        self.routes.get(&route_key(method, path))
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteConfig> {
        self.routes.values()
    }

    pub fn facilitator(&self) -> &F {
        &self.facilitator
    }

    pub fn resource_base_url(&self) -> Option<&str> {
        self.resource_base_url.as_deref()
    }
}

/// Builder for a [`PaymentGate`] with multiple priced routes.
pub struct PaymentGateBuilder<F: Facilitator> {
    pay_to: Address,
    facilitator: F,
    resource_base_url: Option<String>,
    routes: HashMap<String, RouteConfig>,
    error: Option<X402Error>,
}

impl<F: Facilitator> PaymentGateBuilder<F> {
    pub fn new(pay_to: Address, facilitator: F) -> Self {
        Self {
            pay_to,
            facilitator,
            resource_base_url: None,
            routes: HashMap::new(),
            error: None,
        }
    }

    pub fn resource_base_url(mut self, base: Option<&str>) -> Self {
        self.resource_base_url = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// Register a priced route (e.g. `route("GET", "/weather", PriceSpec::new("$0.01", network))`).
    /// Errors surface from [`build`](Self::build).
    pub fn route(mut self, method: &str, path: &str, price: PriceSpec) -> Self {
        if self.error.is_some() {
            return self;
        }
        let method = method.trim().to_ascii_uppercase();
        match self.requirements_for(&method, path, &price) {
            Ok(requirements) => {
                self.routes.insert(
                    route_key(&method, path),
                    RouteConfig {
                        method,
                        path: path.to_string(),
                        price,
                        requirements,
                    },
                );
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    fn requirements_for(
        &self,
        method: &str,
        path: &str,
        price: &PriceSpec,
    ) -> Result<PaymentRequirements, X402Error> {
        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(X402Error::ConfigError(format!(
                "route '{path}': invalid HTTP method '{method}'"
            )));
        }
        if !path.starts_with('/') {
            return Err(X402Error::ConfigError(format!(
                "route path '{path}' must start with '/'"
            )));
        }
        if self.routes.contains_key(&route_key(method, path)) {
            return Err(X402Error::ConfigError(format!(
                "route '{method} {path}' is already priced"
            )));
        }
        if price.max_timeout_seconds == 0 {
            return Err(X402Error::ConfigError(format!(
                "route '{path}': maxTimeoutSeconds must be positive"
            )));
        }

        let chain = ChainConfig::for_network(price.network);
        let scheme = ExactSchemeServer::new(chain.clone());
        let (amount, asset) = scheme.parse_price(&price.price)?;

        Ok(PaymentRequirements {
            scheme: chain.scheme_name.clone(),
            network: price.network.to_string(),
            price: price.price.clone(),
            max_amount_required: amount,
            resource: price.resource.clone().unwrap_or_default(),
            description: price.description.clone(),
            mime_type: price.mime_type.clone(),
            pay_to: self.pay_to,
            max_timeout_seconds: price.max_timeout_seconds,
            asset,
            extra: Some(TokenExtra {
                name: chain.eip712_domain_name,
                version: chain.eip712_domain_version,
            }),
        })
    }

    /// Consume the builder and produce a `PaymentGate`.
    pub fn build(self) -> Result<PaymentGate<F>, X402Error> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(PaymentGate {
            routes: self.routes,
            facilitator: self.facilitator,
            resource_base_url: self.resource_base_url,
        })
    }
}

fn route_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}
