//! Example sending failure alerts to a Telegram chat.
//!
//! Requires `BOT_TOKEN` and `ADMIN_ID` in the environment.
//!
//! Run with: `BOT_TOKEN=... ADMIN_ID=... cargo run --example telegram_alerts`

use hookcall::{AlertingHook, Client, Error};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Product {
    id: u32,
    title: String,
}

fn env_var(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::ConfigurationError(format!("{} is not set", name)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("hookcall=debug,telegram_alerts=info")
        .init();

    let token = env_var("BOT_TOKEN")?;
    let admin_id = env_var("ADMIN_ID")?
        .parse::<i64>()
        .map_err(|e| Error::ConfigurationError(format!("ADMIN_ID is not a chat id: {}", e)))?;

    let client = Client::builder()
        .name("Test Api")
        .base_url("https://dummyjson.com")?
        .logger(tracing::info_span!("test_api"))
        .debug(true)
        .error_hook(AlertingHook::telegram(token, admin_id)?)
        .build()?;

    let product = client
        .get::<Product>("/products/1")
        .payload(json!({"hello": "world"}))
        .build()
        .await?;
    tracing::info!(id = product.id, title = %product.title, "Fetched product");

    // Unknown product with an allow-list that does not cover 404: an alert is sent.
    let blocking_client = client.clone();
    let result = tokio::task::spawn_blocking(move || {
        blocking_client
            .get::<Product>("/products/0")
            .allow_error_codes([400])
            .build()
            .execute()
    })
    .await
    .expect("blocking task panicked");

    if let Err(e) = result {
        tracing::warn!(error = %e, "Request failed, alert sent");
    }

    Ok(())
}
