//! Post messages to an incoming webhook URL, for notifications that need no
//! bot token.
//!
//! <https://api.slack.com/messaging/webhooks>

use crate::block::Message;
use std::{fmt, time::Duration};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum HookError {
    RequestFailed(reqwest::Error),
    Status(u16),
}

impl From<reqwest::Error> for HookError {
    fn from(e: reqwest::Error) -> Self {
        HookError::RequestFailed(e)
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::RequestFailed(e) => write!(f, "Webhook request failed: {}", e),
            HookError::Status(s) => write!(f, "Webhook responded with status {}", s),
        }
    }
}

impl std::error::Error for HookError {}

pub struct Notifier {
    url: Url,
    timeout: Duration,
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(url: Url) -> Self {
        Notifier {
            url,
            timeout: DEFAULT_TIMEOUT,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn notify(&self, msg: &Message) -> Result<(), HookError> {
        let res = self
            .http
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(msg)
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => Ok(()),
            s => Err(HookError::Status(s.as_u16())),
        }
    }
}
