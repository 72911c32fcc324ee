//! # Hookcall - typed API requests, blocking or async, with error alerting
//!
//! Hookcall describes each API call as an immutable [`Request`] built against
//! a shared [`Client`]. The same request can be run on the current thread with
//! [`Request::execute`] or awaited from async code. Both paths log the call,
//! check the status, run the client's [`ErrorHook`] for unexpected errors and
//! deserialize successful bodies into the declared type.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hookcall::Client;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct Product {
//!     id: u64,
//!     title: String,
//!     price: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hookcall::Error> {
//!     let client = Client::builder()
//!         .name("Test Api")
//!         .base_url("https://dummyjson.com")?
//!         .logger(tracing::info_span!("test_api"))
//!         .build()?;
//!
//!     let product = client
//!         .get::<Product>("/products/1")
//!         .payload(json!({"hello": "world"}))
//!         .build()
//!         .await?;
//!     println!("{} costs {}", product.title, product.price);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error statuses and the allow-list
//!
//! Any status of 400 or above is returned as an error built by the client's
//! error factory ([`Error::Api`] by default). When a request carries a
//! non-empty allow-list and the status is not on it, the failure is also
//! logged at `ERROR` and the client's error hook runs. Blocking execution runs
//! the hook before returning; async execution spawns it and returns at once.
//!
//! ```no_run
//! use hookcall::{AlertingHook, Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let client = Client::builder()
//!     .base_url("https://dummyjson.com")?
//!     .error_hook(AlertingHook::telegram("123:bot-token", 42)?)
//!     .build()?;
//!
//! let result = client
//!     .delete::<serde_json::Value>("/products/1")
//!     .allow_error_codes([404])
//!     .build()
//!     .await;
//!
//! match result {
//!     Ok(body) => println!("Deleted: {}", body),
//!     Err(Error::Api(err)) if err.status.as_u16() == 404 => println!("Already gone"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod alerting;
mod client;
mod error;
mod execute;
mod hook;
mod request;
mod response;
mod telegram;

pub use alerting::{alert_text, AlertingHook, Notifier};
pub use client::{Client, ClientBuilder, ErrorFactory};
pub use error::{ApiError, Error, Result};
pub use execute::{run_async, run_blocking};
pub use hook::{ErrorHook, NoopHook};
pub use request::{build_url, ApiMethod, Request, RequestBuilder, RequestInfo};
pub use response::Response;
pub use telegram::{TelegramNotifier, TELEGRAM_API_URL};
