//! The API client shared by many requests.
//!
//! The [`Client`] owns connection configuration (base URL, headers, timeout),
//! the optional logger, the error hook and the error factory. It holds no
//! per-request state and is cheap to clone.

use crate::hook::{ErrorHook, NoopHook};
use crate::request::{ApiMethod, RequestBuilder, RequestInfo};
use crate::{ApiError, Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};
use url::Url;

/// Builds the error returned for an error status.
///
/// The default factory wraps the [`ApiError`] in [`Error::Api`].
pub type ErrorFactory = Arc<dyn Fn(ApiError) -> Error + Send + Sync>;

/// An API client that requests are built against.
///
/// # Examples
///
/// ```no_run
/// use hookcall::Client;
/// use serde::Deserialize;
/// use std::time::Duration;
///
/// #[derive(Deserialize)]
/// struct Product { id: u64, title: String }
///
/// # async fn example() -> Result<(), hookcall::Error> {
/// let client = Client::builder()
///     .name("Products Api")
///     .base_url("https://dummyjson.com")?
///     .timeout(Duration::from_secs(30))
///     .logger(tracing::info_span!("products_api"))
///     .build()?;
///
/// // Await it...
/// let product = client.get::<Product>("/products/1").build().await?;
/// println!("{}", product.title);
///
/// // ...or run it on the current thread.
/// let product = tokio::task::spawn_blocking(move || {
///     client.get::<Product>("/products/1").build().execute()
/// })
/// .await
/// .expect("blocking task panicked")?;
/// println!("{}", product.title);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    name: String,
    http_client: reqwest::Client,
    base_url: String,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    logger: Option<Span>,
    debug: bool,
    error_hook: Arc<dyn ErrorHook>,
    error_factory: ErrorFactory,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The client's display name, used in logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The base URL that request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.default_headers
    }

    /// The span request logs are emitted in, if logging is configured.
    pub fn logger(&self) -> Option<&Span> {
        self.inner.logger.as_ref()
    }

    /// Whether the client was built in debug mode.
    pub fn is_debug(&self) -> bool {
        self.inner.debug
    }

    /// Starts building a request that deserializes its response into `T`.
    pub fn request<T>(&self, method: ApiMethod, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        RequestBuilder::new(self, method, path)
    }

    /// Starts building a `GET` request.
    pub fn get<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        self.request(ApiMethod::Get, path)
    }

    /// Starts building a `POST` request.
    pub fn post<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        self.request(ApiMethod::Post, path)
    }

    /// Starts building a `PUT` request.
    pub fn put<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        self.request(ApiMethod::Put, path)
    }

    /// Starts building a `PATCH` request.
    pub fn patch<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        self.request(ApiMethod::Patch, path)
    }

    /// Starts building a `DELETE` request.
    pub fn delete<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, T>
    where
        T: DeserializeOwned,
    {
        self.request(ApiMethod::Delete, path)
    }

    /// Returns a session for async requests, configured with the client's
    /// headers and timeout.
    ///
    /// The session shares the client's connection pool and is released when
    /// dropped.
    pub fn session(&self) -> reqwest::Client {
        self.inner.http_client.clone()
    }

    /// Builds a session for blocking requests, configured with the client's
    /// headers and timeout.
    ///
    /// Must not be called from within an async runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn blocking_session(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .default_headers(self.inner.default_headers.clone())
            .timeout(self.inner.timeout)
            .build()
            .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
    }

    /// Builds the error for a request that failed with `status`, using the
    /// client's error factory.
    pub fn raise_error(
        &self,
        request: &Arc<RequestInfo>,
        status: StatusCode,
        text: impl Into<String>,
    ) -> Error {
        (self.inner.error_factory)(ApiError::new(Arc::clone(request), status, text))
    }

    /// Runs the blocking error hook.
    pub fn call_error_hook(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        text: &str,
    ) -> Result<()> {
        self.inner.error_hook.on_error(request, status, text)
    }

    /// Spawns the async error hook on the current runtime without waiting for
    /// it.
    ///
    /// A failing hook is logged at `ERROR`. The returned handle may be
    /// dropped; the hook keeps running. Outside of a Tokio runtime the hook
    /// cannot be spawned; this is logged at `ERROR` and `None` is returned.
    pub fn spawn_error_hook(
        &self,
        request: Arc<RequestInfo>,
        status: StatusCode,
        text: String,
    ) -> Option<JoinHandle<()>> {
        let client = self.inner.name.clone();
        let span = self.inner.logger.clone().unwrap_or_else(Span::none);

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                span.in_scope(|| {
                    tracing::error!(
                        client = %client,
                        error = %e,
                        status = status.as_u16(),
                        url = %request.url(),
                        "Error hook not run: no async runtime"
                    );
                });
                return None;
            }
        };

        let hook = Arc::clone(&self.inner.error_hook);
        let handle = runtime.spawn(
            async move {
                if let Err(e) = hook.on_error_async(&request, status, &text).await {
                    tracing::error!(
                        client = %client,
                        error = %e,
                        status = status.as_u16(),
                        url = %request.url(),
                        "Error hook failed"
                    );
                }
            }
            .instrument(span),
        );
        Some(handle)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use hookcall::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), hookcall::Error> {
/// let client = ClientBuilder::new()
///     .name("Example Api")
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    name: String,
    base_url: Option<String>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    logger: Option<Span>,
    debug: bool,
    error_hook: Option<Arc<dyn ErrorHook>>,
    error_factory: Option<ErrorFactory>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            name: "Base Api".to_string(),
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
            logger: None,
            debug: false,
            error_hook: None,
            error_factory: None,
        }
    }

    /// Sets the display name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the base URL for all requests.
    ///
    /// Request paths are appended to it as they are, so it should not end
    /// with a slash if paths start with one.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        Url::parse(url)?;
        self.base_url = Some(url.to_string());
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the span request logs are emitted in.
    ///
    /// Without a logger, requests are not logged.
    pub fn logger(mut self, span: Span) -> Self {
        self.logger = Some(span);
        self
    }

    /// Enables debug mode, which requires a logger.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the hook called when a request fails with an escalated status.
    ///
    /// Defaults to [`NoopHook`].
    pub fn error_hook(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    /// Sets the function that turns an [`ApiError`] into the error returned
    /// to callers.
    ///
    /// # Examples
    ///
    /// ```
    /// use hookcall::{ApiError, Client, Error};
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// #[error("billing api: {0}")]
    /// struct BillingError(ApiError);
    ///
    /// # fn example() -> Result<(), Error> {
    /// let client = Client::builder()
    ///     .base_url("https://billing.example.com")?
    ///     .error_factory(|err| Error::Custom(Box::new(BillingError(err))))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn error_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(ApiError) -> Error + Send + Sync + 'static,
    {
        self.error_factory = Some(Arc::new(factory));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, if debug mode is enabled
    /// without a logger, or if the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        if self.debug && self.logger.is_none() {
            return Err(Error::ConfigurationError(
                "Logger is required in debug mode".to_string(),
            ));
        }

        let mut http_client =
            reqwest::Client::builder().default_headers(self.default_headers.clone());
        if let Some(timeout) = self.timeout {
            http_client = http_client.timeout(timeout);
        }
        let http_client = http_client.build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let error_hook = self.error_hook.unwrap_or_else(|| Arc::new(NoopHook));
        let error_factory = self.error_factory.unwrap_or_else(|| Arc::new(Error::Api));

        Ok(Client {
            inner: Arc::new(ClientInner {
                name: self.name,
                http_client,
                base_url,
                default_headers: self.default_headers,
                timeout: self.timeout,
                logger: self.logger,
                debug: self.debug,
                error_hook,
                error_factory,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
