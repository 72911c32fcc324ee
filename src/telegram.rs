//! Alert delivery through the Telegram Bot API.

use crate::alerting::{AlertingHook, Notifier};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use url::Url;

/// The public Telegram Bot API endpoint.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

/// A [`Notifier`] that posts HTML messages through a Telegram bot.
///
/// The async bot session is created once and shared; a blocking session is
/// created for each blocking send, so the notifier can be built and dropped
/// inside an async runtime.
#[derive(Clone)]
pub struct TelegramNotifier {
    token: String,
    api_url: String,
    bot: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a notifier for the bot identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be
    /// built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::ConfigurationError("Bot token is required".to_string()));
        }

        let bot = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            token,
            api_url: TELEGRAM_API_URL.to_string(),
            bot,
        })
    }

    /// Points the notifier at a different Bot API server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn api_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        Url::parse(url)?;
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }

    fn blocking_bot(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn send(&self, chat_id: i64, html: &str) -> Result<()> {
        let message = SendMessage {
            chat_id,
            text: html,
            parse_mode: "HTML",
        };

        let response = self
            .blocking_bot()?
            .post(self.endpoint())
            .json(&message)
            .send()
            .map_err(hide_token)?;

        let status = response.status();
        if !status.is_success() {
            let raw_response = response.text().unwrap_or_else(|e| e.to_string());
            return Err(Error::Notification {
                status,
                raw_response,
            });
        }

        tracing::debug!(chat_id, "Alert delivered");
        Ok(())
    }

    async fn send_async(&self, chat_id: i64, html: &str) -> Result<()> {
        let message = SendMessage {
            chat_id,
            text: html,
            parse_mode: "HTML",
        };

        let response = self
            .bot
            .post(self.endpoint())
            .json(&message)
            .send()
            .await
            .map_err(hide_token)?;

        let status = response.status();
        if !status.is_success() {
            let raw_response = response.text().await.unwrap_or_else(|e| e.to_string());
            return Err(Error::Notification {
                status,
                raw_response,
            });
        }

        tracing::debug!(chat_id, "Alert delivered");
        Ok(())
    }
}

// The bot token is part of the URL.
fn hide_token(err: reqwest::Error) -> Error {
    Error::Network(err.without_url())
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AlertingHook<TelegramNotifier> {
    /// Creates an alerting hook that sends alerts to `chat_id` through the
    /// bot identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn telegram(token: impl Into<String>, chat_id: i64) -> Result<Self> {
        Ok(Self::new(TelegramNotifier::new(token)?, chat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(matches!(
            TelegramNotifier::new(""),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let notifier = TelegramNotifier::new("123:abc")
            .unwrap()
            .api_url("http://127.0.0.1:8081/")
            .unwrap();
        assert_eq!(notifier.endpoint(), "http://127.0.0.1:8081/bot123:abc/sendMessage");
    }

    #[test]
    fn test_debug_hides_token() {
        let notifier = TelegramNotifier::new("123:secret").unwrap();
        let debug = format!("{:?}", notifier);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("api.telegram.org"));
    }

    #[test]
    fn test_telegram_hook() {
        let hook = AlertingHook::telegram("123:abc", -100).unwrap();
        assert_eq!(hook.chat_id(), -100);
        assert!(hook.sends_alerts());
    }
}
