//! Basic example running the same request async and blocking.
//!
//! This example shows how to:
//! - Create a client with a logger
//! - Await a typed request
//! - Run a request on a blocking thread
//! - Access response metadata
//!
//! Run with: `cargo run --example basic_call`

use hookcall::{Client, Error};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Product {
    id: u32,
    title: String,
    description: String,
    price: f64,
    #[serde(rename = "discountPercentage")]
    discount_percentage: f64,
    rating: f64,
    stock: u32,
    category: String,
    thumbnail: String,
    images: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("hookcall=debug,basic_call=debug")
        .init();

    let client = Client::builder()
        .name("Test Api")
        .base_url("https://dummyjson.com")?
        .logger(tracing::info_span!("test_api"))
        .build()?;

    println!("=== Awaiting a Request ===");
    let product = client
        .get::<Product>("/products/1")
        .payload(json!({"hello": "world"}))
        .build()
        .await?;
    println!("Product {}: {} ({})", product.id, product.title, product.price);
    println!();

    println!("=== Blocking Execution ===");
    let blocking_client = client.clone();
    let product = tokio::task::spawn_blocking(move || {
        blocking_client
            .get::<Product>("/products/1")
            .payload(json!({"hello": "world"}))
            .build()
            .execute()
    })
    .await
    .expect("blocking task panicked")?;
    println!("Product {}: {}", product.id, product.title);
    println!();

    println!("=== Accessing Response Metadata ===");
    let response = client.get::<Product>("/products/2").build().send().await?;
    println!("Status code: {}", response.status);
    println!("Request latency: {:?}", response.latency);
    println!("Content-Type: {:?}", response.header("content-type"));
    println!("Raw response length: {} bytes", response.raw_body.len());

    Ok(())
}
