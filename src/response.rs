//! Response wrapper that keeps the raw response next to the parsed data.
//!
//! Awaiting or executing a [`Request`](crate::Request) returns only the
//! deserialized body. [`Request::send`](crate::Request::send) and
//! [`Request::send_blocking`](crate::Request::send_blocking) return a
//! [`Response`] instead, which also carries the status, headers, latency and
//! raw body.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful API response.
///
/// # Examples
///
/// ```no_run
/// use hookcall::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Product {
///     id: u64,
///     title: String,
/// }
///
/// # async fn example() -> Result<(), hookcall::Error> {
/// let client = Client::builder()
///     .base_url("https://dummyjson.com")?
///     .build()?;
///
/// let response = client.get::<Product>("/products/1").build().send().await?;
///
/// println!("Product: {}", response.title);
/// println!("Request took {:?}", response.latency);
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the whole body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hookcall::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Discards the metadata and returns the data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hookcall::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new((), String::new(), StatusCode::OK, headers, Duration::ZERO);
    ///
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
