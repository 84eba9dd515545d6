use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_client::{ClientConfig, ExactEvmSchemeClient, X402Client, X402Error};

async fn run() -> Result<(), X402Error> {
    // Credentials are checked before any request is made.
    let config = ClientConfig::from_env()?;
    let wallet = ExactEvmSchemeClient::from_private_key(&config.private_key)?;
    tracing::info!(address = %wallet.address(), "private key wallet initialized");
    tracing::info!("make sure this wallet holds USDC on the network you are using");

    let client = X402Client::new(wallet)?.with_max_payment(config.max_payment);

    tracing::info!(url = %config.api_url, "requesting protected endpoint");
    let (resp, receipt) = client.fetch(&config.api_url, reqwest::Method::GET).await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(X402Error::TransportError(format!(
            "request failed with status {status}"
        )));
    }

    let data: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| X402Error::ProtocolError(format!("response is not JSON: {e}")))?;
    println!("{}", serde_json::to_string_pretty(&data)?);

    if let Some(receipt) = receipt {
        tracing::info!(
            transaction = %receipt.transaction,
            network = %receipt.network,
            amount = receipt.amount.as_deref().unwrap_or("unknown"),
            "payment settled"
        );
        if let Some(link) = receipt.explorer_url() {
            tracing::info!(%link, "view transaction");
        }
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "x402 client failed");
        std::process::exit(1);
    }
}
