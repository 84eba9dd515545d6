//! Paying client against a real listening server.

mod common;

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use alloy::signers::local::PrivateKeySigner;
use common::{MockFacilitator, Mode, PAY_TO, TX_HASH};
use x402_client::{ExactEvmSchemeClient, X402Client, X402Error};
use x402_server::{payment_gate, routes, PaymentGate, ServerConfig};

fn config() -> ServerConfig {
    let pay_to = PAY_TO.to_string();
    ServerConfig::from_lookup(move |key| match key {
        "PAY_TO_ADDRESS" => Some(pay_to.clone()),
        _ => None,
    })
    .unwrap()
}

async fn serve(
    facilitator: MockFacilitator,
) -> (String, actix_web::dev::ServerHandle) {
    let config = config();
    let gate = web::Data::new(PaymentGate::new(&config, facilitator).unwrap());
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(payment_gate::<MockFacilitator, _>))
            .app_data(gate.clone())
            .app_data(config.clone())
            .service(routes::secret_knowledge)
            .service(routes::health)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);
    (format!("http://{addr}"), handle)
}

#[actix_rt::test]
async fn paid_fetch_returns_answer_and_receipt() {
    let facilitator = MockFacilitator::new(Mode::CheckSignature);
    let (base, handle) = serve(facilitator.clone()).await;

    let signer = PrivateKeySigner::random();
    let payer = signer.address();
    let client = X402Client::new(ExactEvmSchemeClient::new(signer)).unwrap();
    let (resp, receipt) = client
        .fetch(&format!("{base}/super-secret-knowledge"), reqwest::Method::GET)
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "message": "42" }));

    let receipt = receipt.expect("x-payment-response present");
    assert!(receipt.success);
    assert_eq!(receipt.transaction, TX_HASH);
    assert_eq!(receipt.amount.as_deref(), Some("1000"));
    assert_eq!(facilitator.verifies(), 1);
    assert_eq!(facilitator.settles(), 1);
    assert_ne!(payer, PAY_TO);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn rejected_payment_surfaces_reason_to_client() {
    let facilitator = MockFacilitator::new(Mode::RejectVerify);
    let (base, handle) = serve(facilitator.clone()).await;

    let client = X402Client::new(ExactEvmSchemeClient::new(PrivateKeySigner::random())).unwrap();
    let err = client
        .fetch(&format!("{base}/super-secret-knowledge"), reqwest::Method::GET)
        .await
        .unwrap_err();

    match err {
        X402Error::PaymentRejected(reason) => assert_eq!(reason, "insufficient_funds"),
        other => panic!("expected PaymentRejected, got {other:?}"),
    }
    assert_eq!(facilitator.verifies(), 1);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn free_route_needs_no_payment() {
    let facilitator = MockFacilitator::new(Mode::Accept);
    let (base, handle) = serve(facilitator.clone()).await;

    let client = X402Client::new(ExactEvmSchemeClient::new(PrivateKeySigner::random())).unwrap();
    let (resp, receipt) = client
        .fetch(&format!("{base}/health"), reqwest::Method::GET)
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(receipt.is_none());
    assert_eq!(facilitator.verifies(), 0);

    handle.stop(true).await;
}
