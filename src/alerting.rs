//! Error hook that forwards escalated failures to a notification channel.
//!
//! [`AlertingHook`] formats a short HTML report of the failed request and
//! hands it to a [`Notifier`]. It then calls through to the hook it wraps,
//! which is a [`NoopHook`] unless another one is set with
//! [`AlertingHook::with_inner`].

use crate::error::NO_CONTENT;
use crate::hook::{ErrorHook, NoopHook};
use crate::request::RequestInfo;
use crate::Result;
use async_trait::async_trait;
use http::StatusCode;
use std::sync::Arc;

/// A channel alerts can be delivered to.
///
/// Delivery errors are returned as is; [`AlertingHook`] does not catch them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `html` to `chat_id`, blocking the current thread.
    fn send(&self, chat_id: i64, html: &str) -> Result<()>;

    /// Sends `html` to `chat_id`.
    async fn send_async(&self, chat_id: i64, html: &str) -> Result<()>;
}

/// An [`ErrorHook`] that sends an alert for every escalated error.
///
/// # Examples
///
/// ```no_run
/// use hookcall::{AlertingHook, Client, TelegramNotifier};
///
/// # fn example() -> Result<(), hookcall::Error> {
/// let alerts = AlertingHook::new(TelegramNotifier::new("123:bot-token")?, 42);
///
/// let client = Client::builder()
///     .name("Test Api")
///     .base_url("https://dummyjson.com")?
///     .error_hook(alerts)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AlertingHook<N> {
    notifier: N,
    chat_id: i64,
    send_alerts: bool,
    inner: Arc<dyn ErrorHook>,
}

impl<N> AlertingHook<N>
where
    N: Notifier,
{
    /// Creates a hook that alerts `chat_id` through `notifier`.
    pub fn new(notifier: N, chat_id: i64) -> Self {
        Self {
            notifier,
            chat_id,
            send_alerts: true,
            inner: Arc::new(NoopHook),
        }
    }

    /// Turns alert delivery on or off. The wrapped hook runs either way.
    pub fn send_alerts(mut self, send_alerts: bool) -> Self {
        self.send_alerts = send_alerts;
        self
    }

    /// Sets the hook called after the alert has been sent.
    pub fn with_inner(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.inner = Arc::new(hook);
        self
    }

    /// The chat alerts are sent to.
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Whether alerts are delivered.
    pub fn sends_alerts(&self) -> bool {
        self.send_alerts
    }

    /// The notification channel.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

#[async_trait]
impl<N> ErrorHook for AlertingHook<N>
where
    N: Notifier,
{
    fn on_error(&self, request: &RequestInfo, status: StatusCode, text: &str) -> Result<()> {
        if self.send_alerts {
            self.notifier.send(self.chat_id, &alert_text(request, status, text))?;
        }

        self.inner.on_error(request, status, text)
    }

    async fn on_error_async(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        text: &str,
    ) -> Result<()> {
        if self.send_alerts {
            self.notifier
                .send_async(self.chat_id, &alert_text(request, status, text))
                .await?;
        }

        self.inner.on_error_async(request, status, text).await
    }
}

/// Formats the HTML alert for a failed request.
///
/// # Examples
///
/// ```
/// use hookcall::{alert_text, ApiMethod, RequestInfo};
/// use http::StatusCode;
///
/// let request = RequestInfo::new(ApiMethod::Get, "https://dummyjson.com/products/1", None);
/// assert_eq!(
///     alert_text(&request, StatusCode::BAD_GATEWAY, ""),
///     "[GET] -> RESP 502\nURL: https://dummyjson.com/products/1\nRESP:\n<code>*no content*</code>"
/// );
/// ```
pub fn alert_text(request: &RequestInfo, status: StatusCode, text: &str) -> String {
    let mut alert = format!(
        "[{}] -> RESP {}\nURL: {}\n",
        request.method(),
        status.as_u16(),
        escape_html(request.url())
    );

    if let Some(payload) = request.pretty_payload() {
        alert.push_str(&format!("PAYLOAD:\n<code>{}</code>\n", escape_html(&payload)));
    }

    let content = if text.is_empty() { NO_CONTENT } else { text };
    alert.push_str(&format!("RESP:\n<code>{}</code>", escape_html(content)));
    alert
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}
