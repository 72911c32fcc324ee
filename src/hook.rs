//! Error hooks invoked when a request fails with an unexpected status.
//!
//! A hook is injected into the [`Client`](crate::Client) at construction time
//! and is shared by every request made through it. The blocking strategy
//! calls [`ErrorHook::on_error`] synchronously before returning the error; the
//! async strategy spawns [`ErrorHook::on_error_async`] on the runtime and
//! returns the error without waiting for it.

use crate::request::RequestInfo;
use crate::Result;
use async_trait::async_trait;
use http::StatusCode;

/// Reacts to requests that failed with an escalated error status.
///
/// Both methods default to doing nothing. Implementations that wrap another
/// hook should call through to it after doing their own work.
///
/// # Examples
///
/// ```
/// use hookcall::{ErrorHook, RequestInfo, Result};
/// use http::StatusCode;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CountingHook(AtomicUsize);
///
/// #[async_trait::async_trait]
/// impl ErrorHook for CountingHook {
///     fn on_error(&self, _request: &RequestInfo, _status: StatusCode, _text: &str) -> Result<()> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ErrorHook: Send + Sync {
    /// Called by blocking execution before the error is returned.
    ///
    /// An error returned here is propagated to the caller instead of the
    /// request's own error.
    fn on_error(&self, request: &RequestInfo, status: StatusCode, text: &str) -> Result<()> {
        let _ = (request, status, text);
        Ok(())
    }

    /// Called by async execution on a detached task.
    ///
    /// The failing request does not wait for this to finish; an error
    /// returned here is logged by the task.
    async fn on_error_async(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        text: &str,
    ) -> Result<()> {
        let _ = (request, status, text);
        Ok(())
    }
}

/// The default hook, which does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl ErrorHook for NoopHook {}
