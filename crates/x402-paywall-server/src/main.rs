use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402::FacilitatorClient;
use x402_server::{payment_gate, routes, PaymentGate, ServerConfig};

fn build_cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        Cors::default()
            .allowed_origin_fn(|origin, _| {
                origin
                    .to_str()
                    .map(|o| {
                        // Match http://localhost or http://localhost:PORT exactly
                        o == "http://localhost" || o.starts_with("http://localhost:")
                    })
                    .unwrap_or(false)
            })
            .allow_any_method()
            .allow_any_header()
            .expose_headers(["X-PAYMENT-RESPONSE"])
            .max_age(3600)
    } else {
        let mut cors = Cors::default();
        for origin in origins {
            cors = cors.allowed_origin(origin);
        }
        cors.allow_any_method()
            .allow_any_header()
            .expose_headers(["X-PAYMENT-RESPONSE"])
            .max_age(3600)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };

    let facilitator = FacilitatorClient::new(&config.facilitator_url)
        .with_hmac_secret(config.hmac_secret.clone());
    tracing::info!(
        network = %config.network,
        facilitator = %facilitator.url(),
        signed = config.hmac_secret.is_some(),
        pay_to = %config.pay_to,
        "payments settle through facilitator"
    );

    let gate = match PaymentGate::new(&config, facilitator) {
        Ok(g) => web::Data::new(g),
        Err(e) => {
            tracing::error!(error = %e, "invalid route pricing");
            std::process::exit(1);
        }
    };

    let governor_conf = match GovernorConfigBuilder::default()
        .requests_per_minute(config.rate_limit_rpm)
        .finish()
    {
        Some(c) => c,
        None => {
            tracing::error!(rpm = config.rate_limit_rpm, "invalid RATE_LIMIT_RPM");
            std::process::exit(1);
        }
    };

    let port = config.port;
    tracing::info!("x402 paywall server listening at http://localhost:{port}");
    for route in gate.routes() {
        tracing::info!(
            method = %route.method,
            path = %route.path,
            price = %route.price.price,
            amount = %route.requirements.max_amount_required,
            "priced route"
        );
    }
    tracing::info!("Rate limit: {} req/min per IP", config.rate_limit_rpm);

    let cors_origins = config.allowed_origins.clone();
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(payment_gate::<FacilitatorClient, _>))
            .wrap(Governor::new(&governor_conf))
            .wrap(build_cors(&cors_origins))
            .app_data(gate.clone())
            .app_data(config.clone())
            .service(routes::secret_knowledge)
            .service(routes::metrics_endpoint)
            .service(routes::health)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
