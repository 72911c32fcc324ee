//! Error types for API requests.
//!
//! Every failure is surfaced to the immediate caller. A non-success status
//! becomes an [`ApiError`] (wrapped by the client's error factory, see
//! [`ClientBuilder::error_factory`](crate::ClientBuilder::error_factory)),
//! while a successful status whose body does not match the declared type
//! becomes [`Error::Validation`].

use crate::request::RequestInfo;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// Marker written in place of an empty response body.
pub(crate) const NO_CONTENT: &str = "*no content*";

/// The main error type for API requests.
///
/// # Examples
///
/// ```no_run
/// use hookcall::{Client, Error};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Product { id: u64 }
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://dummyjson.com")?
///     .build()?;
///
/// match client.get::<Product>("/products/1").build().await {
///     Ok(product) => println!("Got product {}", product.id),
///     Err(Error::Api(err)) => eprintln!("API error {}", err),
///     Err(Error::Validation { raw_response, serde_error, .. }) => {
///         eprintln!("Unexpected body {}: {}", raw_response, serde_error);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed,
    /// timeout, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote endpoint answered with a status of 400 or above.
    ///
    /// This is what the default error factory produces.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An error built by a custom error factory.
    ///
    /// Use [`Error::downcast_custom`] to get the concrete type back.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    /// The status was successful but the body could not be deserialized into
    /// the declared return type.
    #[error("Failed to validate response (status {status}): {serde_error}")]
    Validation {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The client was configured incorrectly (missing base URL, debug mode
    /// without a logger, invalid header, ...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request payload.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A notification channel refused to deliver an alert.
    #[error("Notification rejected (status {status}): {raw_response}")]
    Notification {
        /// The HTTP status code returned by the channel
        status: StatusCode,
        /// The raw response body returned by the channel
        raw_response: String,
    },
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::Validation { status, .. } => Some(*status),
            Error::Notification { status, .. } => Some(*status),
            Error::Network(err) => err.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api(err) => Some(&err.text),
            Error::Validation { raw_response, .. } => Some(raw_response),
            Error::Notification { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the [`ApiError`] if this is a default API error.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns a reference to the error built by a custom error factory, if it
    /// has type `E`.
    pub fn downcast_custom<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Custom(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// A request that the remote endpoint answered with an error status.
///
/// Carries the status, the response text and a snapshot of the request that
/// caused it, so hooks and callers can report on it.
///
/// # Examples
///
/// ```
/// use hookcall::{ApiError, ApiMethod, RequestInfo};
/// use http::StatusCode;
///
/// let request = RequestInfo::new(ApiMethod::Get, "https://dummyjson.com/products/1", None);
/// let err = ApiError::new(request, StatusCode::NOT_FOUND, "");
/// assert_eq!(err.to_string(), "[404] *no content*");
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The request that failed.
    pub request: Arc<RequestInfo>,
    /// The HTTP status code returned by the endpoint.
    pub status: StatusCode,
    /// The response body, possibly empty.
    pub text: String,
}

impl ApiError {
    /// Creates a new `ApiError`.
    pub fn new(
        request: impl Into<Arc<RequestInfo>>,
        status: StatusCode,
        text: impl Into<String>,
    ) -> Self {
        Self {
            request: request.into(),
            status,
            text: text.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.text.is_empty() {
            NO_CONTENT
        } else {
            &self.text
        };
        write!(f, "[{}] {}", self.status.as_u16(), text)
    }
}

impl std::error::Error for ApiError {}

/// A specialized `Result` type for API requests.
pub type Result<T> = std::result::Result<T, Error>;
