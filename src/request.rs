//! Request values and the builder that produces them.
//!
//! A [`Request`] is an immutable description of one outbound call. Its URL is
//! fully resolved when [`RequestBuilder::build`] runs; nothing is mutated
//! afterwards. The same value can be run either in blocking mode
//! ([`Request::execute`]) or awaited directly.

use crate::client::Client;
use crate::error::NO_CONTENT;
use crate::{Error, Result};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::Level;
use url::form_urlencoded;

/// The HTTP methods an API request can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl ApiMethod {
    /// Returns the method name in upper case.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Patch => "PATCH",
            ApiMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ApiMethod> for Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Patch => Method::PATCH,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

/// The parts of a request that hooks and errors report on.
///
/// This is the non-generic half of a [`Request`]: it does not know the
/// declared return type, so it can be shared with error hooks and carried by
/// [`ApiError`](crate::ApiError).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    method: ApiMethod,
    url: String,
    payload: Option<Value>,
}

impl RequestInfo {
    /// Creates a new `RequestInfo` from an already-resolved URL.
    pub fn new(method: ApiMethod, url: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            payload,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    /// The absolute, query-encoded URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The JSON payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// The payload as indented JSON, or `None` if there is no payload.
    ///
    /// A JSON `null` payload counts as absent.
    pub fn pretty_payload(&self) -> Option<String> {
        match &self.payload {
            None | Some(Value::Null) => None,
            Some(payload) => serde_json::to_string_pretty(payload).ok(),
        }
    }
}

/// Joins the base URL and path, and appends the query string.
///
/// Pairs whose value is `None` are dropped. The remaining pairs keep their
/// order and are form-encoded, except that `+` is left as is.
///
/// # Examples
///
/// ```
/// use hookcall::build_url;
///
/// let url = build_url(
///     "https://dummyjson.com",
///     "/products/search",
///     [("q", Some("phone case")), ("sort", None), ("tag", Some("a+b"))],
/// );
/// assert_eq!(url, "https://dummyjson.com/products/search?q=phone+case&tag=a+b");
/// ```
pub fn build_url<K, V, I>(base_url: &str, path: &str, query: I) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, Option<V>)>,
{
    let mut url = format!("{}{}", base_url, path);

    let pairs: Vec<String> = query
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|value| {
                format!(
                    "{}={}",
                    encode_component(key.as_ref()),
                    encode_component(value.as_ref())
                )
            })
        })
        .collect();

    if !pairs.is_empty() {
        url.push('?');
        url.push_str(&pairs.join("&"));
    }

    url
}

fn encode_component(value: &str) -> String {
    // The serializer only ever emits %2B for a literal '+'.
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%2B", "+")
}

/// An immutable API request whose response is deserialized into `T`.
///
/// Build one with [`Client::request`] or one of the method shortcuts.
/// Run it with [`Request::execute`] (blocking) or by awaiting it.
///
/// # Examples
///
/// ```no_run
/// use hookcall::Client;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Product { id: u64, title: String }
///
/// # async fn example() -> Result<(), hookcall::Error> {
/// let client = Client::builder()
///     .base_url("https://dummyjson.com")?
///     .build()?;
///
/// let product = client
///     .get::<Product>("/products/1")
///     .payload(json!({"hello": "world"}))
///     .allow_error_codes([404])
///     .build()
///     .await?;
/// println!("{}: {}", product.id, product.title);
/// # Ok(())
/// # }
/// ```
pub struct Request<'a, T> {
    pub(crate) client: &'a Client,
    pub(crate) info: Arc<RequestInfo>,
    allowed_error_codes: Option<Vec<u16>>,
    _returns: PhantomData<fn() -> T>,
}

impl<'a, T> Request<'a, T> {
    /// The client this request runs against.
    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// The HTTP method.
    pub fn method(&self) -> ApiMethod {
        self.info.method
    }

    /// The absolute, query-encoded URL.
    pub fn url(&self) -> &str {
        &self.info.url
    }

    /// The JSON payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.info.payload.as_ref()
    }

    /// The statuses treated as expected errors, if an allow-list was set.
    pub fn allowed_error_codes(&self) -> Option<&[u16]> {
        self.allowed_error_codes.as_deref()
    }

    /// The non-generic description of this request.
    pub fn info(&self) -> &Arc<RequestInfo> {
        &self.info
    }

    /// Returns `true` if an error `status` must be escalated: logged at
    /// `ERROR` and passed to the client's error hook.
    ///
    /// Escalation only happens when a non-empty allow-list is set and the
    /// status is not on it. Without an allow-list nothing is escalated. The
    /// error is returned to the caller either way.
    pub fn escalates(&self, status: StatusCode) -> bool {
        match &self.allowed_error_codes {
            Some(codes) if !codes.is_empty() => !codes.contains(&status.as_u16()),
            _ => false,
        }
    }

    /// Emits one log record for a completed attempt through the client's
    /// logger. Does nothing if the client has no logger.
    pub(crate) fn log_response(&self, status: StatusCode, text: &str, level: Level) {
        let Some(span) = self.client.logger() else {
            return;
        };

        let payload = self.info.pretty_payload();
        let response = if text.is_empty() { NO_CONTENT } else { text };

        span.in_scope(|| {
            if level == Level::ERROR {
                tracing::error!(
                    client = %self.client.name(),
                    method = %self.info.method,
                    status = status.as_u16(),
                    url = %self.info.url,
                    payload = payload.as_deref(),
                    response = %response,
                    "Unexpected API error"
                );
            } else {
                tracing::debug!(
                    client = %self.client.name(),
                    method = %self.info.method,
                    status = status.as_u16(),
                    url = %self.info.url,
                    payload = payload.as_deref(),
                    response = %response,
                    "API request completed"
                );
            }
        });
    }
}

impl<T> Clone for Request<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            info: Arc::clone(&self.info),
            allowed_error_codes: self.allowed_error_codes.clone(),
            _returns: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Request<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("client", &self.client.name())
            .field("method", &self.info.method)
            .field("url", &self.info.url)
            .field("payload", &self.info.payload)
            .field("allowed_error_codes", &self.allowed_error_codes)
            .finish()
    }
}

/// Builder for a [`Request`].
///
/// Collects the path, payload, query arguments and error allow-list; the URL
/// is resolved once, in [`RequestBuilder::build`].
pub struct RequestBuilder<'a, T> {
    client: &'a Client,
    method: ApiMethod,
    path: String,
    payload: Option<Value>,
    query: Vec<(String, Option<String>)>,
    allowed_error_codes: Option<Vec<u16>>,
    _returns: PhantomData<fn() -> T>,
}

impl<'a, T> RequestBuilder<'a, T>
where
    T: DeserializeOwned,
{
    pub(crate) fn new(client: &'a Client, method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            client,
            method,
            path: path.into(),
            payload: None,
            query: Vec::new(),
            allowed_error_codes: None,
            _returns: PhantomData,
        }
    }

    /// Sets the JSON payload sent as the request body.
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Serializes `body` and uses it as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `body` cannot be represented
    /// as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let payload =
            serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.payload = Some(payload);
        Ok(self)
    }

    /// Adds a query argument.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), Some(value.to_string())));
        self
    }

    /// Adds a query argument that is dropped from the URL when `value` is
    /// `None`.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|value| value.to_string())));
        self
    }

    /// Sets the error statuses that are expected for this request.
    ///
    /// See [`Request::escalates`] for what the allow-list controls.
    pub fn allow_error_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.allowed_error_codes = Some(codes.into_iter().collect());
        self
    }

    /// Resolves the URL and returns the immutable request.
    pub fn build(self) -> Request<'a, T> {
        let url = build_url(self.client.base_url(), &self.path, self.query);

        Request {
            client: self.client,
            info: Arc::new(RequestInfo::new(self.method, url, self.payload)),
            allowed_error_codes: self.allowed_error_codes,
            _returns: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_without_query() {
        let url = build_url::<&str, &str, _>("https://dummyjson.com", "/products/1", []);
        assert_eq!(url, "https://dummyjson.com/products/1");
    }

    #[test]
    fn test_build_url_drops_none_values() {
        let url = build_url(
            "https://api.example.com",
            "/items",
            [("page", Some("2")), ("cursor", None), ("limit", Some("10"))],
        );
        assert_eq!(url, "https://api.example.com/items?page=2&limit=10");
    }

    #[test]
    fn test_build_url_all_none_has_no_question_mark() {
        let url = build_url::<_, &str, _>("https://api.example.com", "/items", [("a", None)]);
        assert_eq!(url, "https://api.example.com/items");
    }

    #[test]
    fn test_build_url_keeps_plus_and_escapes_the_rest() {
        let url = build_url(
            "https://api.example.com",
            "/search",
            [("q", Some("c++ & rust")), ("tz", Some("+03:00"))],
        );
        assert_eq!(
            url,
            "https://api.example.com/search?q=c+++%26+rust&tz=+03%3A00"
        );
    }

    #[test]
    fn test_build_url_is_stable() {
        let query = vec![("b", Some("1")), ("a", Some("2"))];
        let first = build_url("https://x.test", "/p", query.clone());
        let second = build_url("https://x.test", "/p", query);
        assert_eq!(first, second);
        assert_eq!(first, "https://x.test/p?b=1&a=2");
    }

    #[test]
    fn test_pretty_payload() {
        let info = RequestInfo::new(
            ApiMethod::Post,
            "https://x.test",
            Some(json!({"hello": "world"})),
        );
        assert_eq!(
            info.pretty_payload().as_deref(),
            Some("{\n  \"hello\": \"world\"\n}")
        );

        let info = RequestInfo::new(
            ApiMethod::Post,
            "https://x.test",
            Some(json!({"name": "Ёж"})),
        );
        assert!(info.pretty_payload().unwrap_or_default().contains("Ёж"));

        let info = RequestInfo::new(ApiMethod::Get, "https://x.test", Some(Value::Null));
        assert_eq!(info.pretty_payload(), None);

        let info = RequestInfo::new(ApiMethod::Get, "https://x.test", None);
        assert_eq!(info.pretty_payload(), None);
    }

    #[test]
    fn test_method_conversions() {
        assert_eq!(ApiMethod::Patch.to_string(), "PATCH");
        assert_eq!(Method::from(ApiMethod::Delete), Method::DELETE);
        assert_eq!(Method::from(ApiMethod::Get), Method::GET);
    }
}
