//! The two ways of running a [`Request`].
//!
//! [`run_blocking`] occupies the calling thread for the whole call.
//! [`run_async`] suspends the calling task at the HTTP call instead. Both
//! follow the same steps:
//!
//! 1. take a session from the client,
//! 2. send the method, URL and JSON payload,
//! 3. log the response at `DEBUG`,
//! 4. for a status of 400 or above, if the status is escalated (see
//!    [`Request::escalates`]), log again at `ERROR` and run the error hook,
//!    then return the error built by the client's error factory,
//! 5. otherwise deserialize the body into `T`.
//!
//! The blocking strategy waits for the hook; the async strategy spawns it and
//! returns the error right away.

use crate::request::Request;
use crate::{Error, Response, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;

/// Runs `request`, blocking the current thread until it completes.
///
/// Called from within a Tokio runtime, the call is made on a scoped helper
/// thread that inherits the caller's tracing dispatcher, and the calling
/// thread waits for it. Prefer `tokio::task::spawn_blocking` in async code,
/// since this still blocks a runtime worker.
///
/// # Errors
///
/// Returns the client's error for a status of 400 or above,
/// [`Error::Validation`] if the body does not match `T`, the hook's error if
/// the blocking error hook fails, and [`Error::Network`] for transport
/// failures.
pub fn run_blocking<T>(request: &Request<'_, T>) -> Result<Response<T>>
where
    T: DeserializeOwned + Send,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return blocking_call(request);
    }

    // reqwest's blocking client panics when dropped inside a runtime context.
    let dispatch = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
    std::thread::scope(|scope| {
        scope
            .spawn(|| tracing::dispatcher::with_default(&dispatch, || blocking_call(request)))
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}

fn blocking_call<T>(request: &Request<'_, T>) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    let client = request.client();
    let session = client.blocking_session()?;

    let start_time = Instant::now();
    let mut builder = session.request(request.method().into(), request.url());
    if let Some(payload) = body(request) {
        builder = builder.json(payload);
    }
    let response = builder.send()?;

    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text()?;
    let latency = start_time.elapsed();

    request.log_response(status, &text, Level::DEBUG);

    if is_error(status) {
        if request.escalates(status) {
            request.log_response(status, &text, Level::ERROR);
            client.call_error_hook(request.info(), status, &text)?;
        }
        return Err(client.raise_error(request.info(), status, text));
    }

    parse_response(text, status, headers, latency)
}

/// Runs `request` without blocking the thread.
///
/// An escalated error status spawns the client's async error hook on the
/// current Tokio runtime; the returned future does not wait for it.
///
/// # Errors
///
/// Returns the client's error for a status of 400 or above,
/// [`Error::Validation`] if the body does not match `T`, and
/// [`Error::Network`] for transport failures.
pub async fn run_async<T>(request: &Request<'_, T>) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    let client = request.client();
    let session = client.session();

    let start_time = Instant::now();
    let mut builder = session.request(request.method().into(), request.url());
    if let Some(payload) = body(request) {
        builder = builder.json(payload);
    }
    let response = builder.send().await?;

    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await?;
    let latency = start_time.elapsed();

    request.log_response(status, &text, Level::DEBUG);

    if is_error(status) {
        if request.escalates(status) {
            request.log_response(status, &text, Level::ERROR);
            client.spawn_error_hook(Arc::clone(request.info()), status, text.clone());
        }
        return Err(client.raise_error(request.info(), status, text));
    }

    parse_response(text, status, headers, latency)
}

impl<T> Request<'_, T>
where
    T: DeserializeOwned,
{
    /// Runs the request on the current thread and returns the deserialized
    /// body.
    ///
    /// See [`run_blocking`].
    pub fn execute(&self) -> Result<T>
    where
        T: Send,
    {
        run_blocking(self).map(Response::into_inner)
    }

    /// Runs the request on the current thread and returns the full response.
    pub fn send_blocking(&self) -> Result<Response<T>>
    where
        T: Send,
    {
        run_blocking(self)
    }

    /// Runs the request asynchronously and returns the full response.
    ///
    /// Awaiting the request itself returns only the deserialized body.
    pub async fn send(&self) -> Result<Response<T>> {
        run_async(self).await
    }
}

impl<'a, T> IntoFuture for Request<'a, T>
where
    T: DeserializeOwned + Send + 'a,
{
    type Output = Result<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { run_async(&self).await.map(Response::into_inner) })
    }
}

impl<'r, 'a: 'r, T> IntoFuture for &'r Request<'a, T>
where
    T: DeserializeOwned + Send + 'r,
{
    type Output = Result<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<T>> + Send + 'r>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { run_async(self).await.map(Response::into_inner) })
    }
}

fn body<'r, T>(request: &'r Request<'_, T>) -> Option<&'r Value> {
    request.payload().filter(|payload| !payload.is_null())
}

fn is_error(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

fn parse_response<T>(
    raw_body: String,
    status: StatusCode,
    headers: HeaderMap,
    latency: Duration,
) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    match serde_json::from_str::<T>(&raw_body) {
        Ok(data) => Ok(Response::new(data, raw_body, status, headers, latency)),
        Err(e) => Err(Error::Validation {
            raw_response: raw_body,
            serde_error: e.to_string(),
            status,
        }),
    }
}
