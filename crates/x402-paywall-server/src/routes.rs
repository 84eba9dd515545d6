use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::config::ServerConfig;

/// The priced demo resource.
#[get("/super-secret-knowledge")]
pub async fn secret_knowledge() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "42" }))
}

#[get("/metrics")]
pub async fn metrics_endpoint(req: HttpRequest, config: web::Data<ServerConfig>) -> HttpResponse {
    match &config.metrics_token {
        Some(expected) => {
            let header = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok());

            if !x402::security::bearer_matches(header, expected) {
                return HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "unauthorized",
                    "message": "Valid Bearer token required for /metrics"
                }));
            }
        }
        None => {
            // No token configured: metrics stay private unless opted in.
            if !config.public_metrics {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "forbidden",
                    "message": "Set METRICS_TOKEN or X402_PUBLIC_METRICS=true to access /metrics"
                }));
            }
        }
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(crate::metrics::metrics_output())
}

#[get("/health")]
pub async fn health(config: web::Data<ServerConfig>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "x402-paywall-server",
        "network": config.network,
        "facilitator": config.facilitator_url,
    }))
}
