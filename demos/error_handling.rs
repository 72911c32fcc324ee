//! Example demonstrating error handling and the allow-list.
//!
//! This example shows how to:
//! - Handle API errors and read their status and body
//! - Deal with responses that do not match the declared type
//! - Use an allow-list so expected errors do not trigger the error hook
//! - Plug in a custom error hook
//!
//! Run with: `cargo run --example error_handling`

use async_trait::async_trait;
use hookcall::{Client, Error, ErrorHook, RequestInfo};
use http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Product {
    id: u32,
    title: String,
}

/// Prints every escalated failure to stderr.
struct StderrHook;

#[async_trait]
impl ErrorHook for StderrHook {
    fn on_error(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        text: &str,
    ) -> hookcall::Result<()> {
        eprintln!(
            "[hook] {} {} -> {}: {}",
            request.method(),
            request.url(),
            status,
            text
        );
        Ok(())
    }

    async fn on_error_async(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        text: &str,
    ) -> hookcall::Result<()> {
        self.on_error(request, status, text)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("hookcall=info,error_handling=debug")
        .init();

    let client = Client::builder()
        .name("Products Api")
        .base_url("https://dummyjson.com")?
        .logger(tracing::info_span!("products_api"))
        .error_hook(StderrHook)
        .build()?;

    println!("=== Example 1: Handling API Errors ===");
    match client.get::<Product>("/products/999999").build().await {
        Ok(product) => println!("Success: {:?}", product),
        Err(Error::Api(err)) => {
            println!("API Error: {}", err);
            println!("  Status: {}", err.status);
            println!("  URL: {}", err.request.url());
            println!("  Body: {}", err.text);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Validation Errors ===");
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    match client.get::<WrongSchema>("/products/1").build().await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Validation {
            raw_response,
            serde_error,
            status,
        }) => {
            println!("Validation Failed!");
            println!("  Status: {}", status);
            println!("  Serde error: {}", serde_error);
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Expected vs Unexpected Errors ===");
    // 404 is on the allow-list: the error is returned but the hook stays quiet.
    let result = client
        .get::<Product>("/products/999999")
        .allow_error_codes([404])
        .build()
        .await;
    println!("Allowed 404: {:?}", result.err().and_then(|e| e.status()));

    // 404 is not on this allow-list: the hook fires as well.
    let result = client
        .get::<Product>("/products/999999")
        .allow_error_codes([409])
        .build()
        .await;
    println!("Escalated 404: {:?}", result.err().and_then(|e| e.status()));

    // Give the detached hook a moment to print.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    Ok(())
}
