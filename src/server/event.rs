//! Event subscriptions: the platform POSTs an `event_callback` envelope for
//! every subscribed event, and we must acknowledge quickly. Handlers run after
//! the acknowledgement.
//!
//! <https://api.slack.com/apis/connections/events-api#receiving_events>

use super::{
    context::Context,
    error::MalformedRequest,
    payload::JsonEnvelope,
    props::{FieldError, Props},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::ops::Deref;

/// The only envelope discriminator that carries an application event.
pub const EVENT_CALLBACK: &str = "event_callback";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventCallback {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub api_app_id: String,
    pub event: Event,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub authorizations: Authorizations,
    /// Unique per event, and stable across the platform's retries of it.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub event_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub event_context: String,
    #[serde(default, deserialize_with = "crate::de::unix_seconds")]
    pub event_time: Option<i64>,
}

impl EventCallback {
    /// Decode an `event_callback` envelope. The inner event must at least say
    /// what type it is.
    pub fn decode(envelope: &JsonEnvelope) -> Result<Self, MalformedRequest> {
        let callback: EventCallback = envelope.decode("event callback")?;

        callback
            .event
            .kind()
            .map_err(|e| MalformedRequest::Decode {
                what: "event",
                reason: e.to_string(),
            })?;

        Ok(callback)
    }
}

/// The inner event. Its shape depends entirely on its `type` (and sometimes
/// `subtype`), so it's left as [Props] for handlers to pick apart.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Event(Props);

impl Event {
    pub fn kind(&self) -> Result<&str, FieldError> {
        self.0.str("type")
    }

    /// Messages in particular come in many subtypes (`bot_message`,
    /// `message_changed`, ...). Plain user messages have none.
    pub fn subtype(&self) -> Result<Option<&str>, FieldError> {
        self.0.opt_str("subtype")
    }

    pub fn props(&self) -> &Props {
        &self.0
    }
}

impl Deref for Event {
    type Target = Props;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Props> for Event {
    fn from(props: Props) -> Self {
        Event(props)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub enterprise_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_bot: bool,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_enterprise_install: bool,
}

/// Who the event is visible to on our side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Authorizations(pub Vec<Authorization>);

impl Authorizations {
    /// Whether the installation this event was delivered for is a bot.
    pub fn is_bot(&self) -> bool {
        self.0.first().map(|a| a.is_bot).unwrap_or(false)
    }

    /// The user id we were authorized as, e.g. to ignore our own messages.
    pub fn user_id(&self) -> Option<&str> {
        self.0.first().map(|a| a.user_id.as_str())
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Runs after the request was acknowledged. Errors are logged, never sent.
    async fn handle_event(&self, ctx: &Context, callback: EventCallback) -> anyhow::Result<()>;
}
