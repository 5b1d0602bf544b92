//! Interactivity: button presses, message shortcuts and modal lifecycle
//! callbacks. The platform sends these as a form whose `payload` field is a
//! JSON document discriminated by `type`.
//!
//! <https://api.slack.com/interactivity/handling#payloads>

use super::{
    context::Context,
    error::GatewayError,
    payload::JsonEnvelope,
    props::{FieldError, Props},
};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
}

/// One interacted-with element. The fields every element has are lifted out;
/// the rest (`selected_option`, `selected_date`, ...) stays in `content`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default, deserialize_with = "crate::de::null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub block_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub action_id: String,
    #[serde(default, deserialize_with = "crate::de::lenient_string")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub content: Props,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockActions {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub trigger_id: String,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team: Team,
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Set when the actions came from a message.
    #[serde(default)]
    pub message: Option<Props>,
    /// Set when the actions came from a modal or the home tab.
    #[serde(default)]
    pub view: Option<Props>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InteractionMessage {
    #[serde(rename = "type", default, deserialize_with = "crate::de::null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub ts: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageActions {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub callback_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub trigger_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_url: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub message: InteractionMessage,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub channel: Channel,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewClosed {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team: Team,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub view: Props,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_cleared: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseUrl {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub block_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub action_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub channel_id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewSubmission {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub team: Team,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub user: User,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub view: Props,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub hash: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_urls: Vec<ResponseUrl>,
}

impl ViewSubmission {
    pub fn callback_id(&self) -> Result<Option<&str>, FieldError> {
        self.view.opt_str("callback_id")
    }

    /// Whatever the app stashed in the view when it opened it.
    pub fn private_metadata(&self) -> Result<Option<&str>, FieldError> {
        self.view.opt_str("private_metadata")
    }

    /// Submitted input values, keyed by block id then action id.
    pub fn state_values(&self) -> Result<Props, FieldError> {
        self.view.props("state")?.props("values")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    BlockActions(BlockActions),
    MessageActions(MessageActions),
    ViewClosed(ViewClosed),
    ViewSubmission(ViewSubmission),
}

impl Interaction {
    /// Decode by discriminator. An unrecognized `type` is its own failure,
    /// apart from a recognized one with a bad body.
    pub fn decode(envelope: &JsonEnvelope) -> Result<Self, GatewayError> {
        let interaction = match envelope.kind.as_str() {
            "block_actions" => Interaction::BlockActions(envelope.decode("block actions")?),
            "message_actions" => Interaction::MessageActions(envelope.decode("message actions")?),
            "view_closed" => Interaction::ViewClosed(envelope.decode("view closed")?),
            "view_submission" => Interaction::ViewSubmission(envelope.decode("view submission")?),
            other => return Err(GatewayError::UnknownInteraction(other.to_owned())),
        };

        Ok(interaction)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Interaction::BlockActions(_) => "block_actions",
            Interaction::MessageActions(_) => "message_actions",
            Interaction::ViewClosed(_) => "view_closed",
            Interaction::ViewSubmission(_) => "view_submission",
        }
    }

    pub async fn dispatch(
        self,
        handler: &dyn InteractivityHandler,
        ctx: &Context,
    ) -> anyhow::Result<()> {
        match self {
            Interaction::BlockActions(p) => handler.handle_block_actions(ctx, p).await,
            Interaction::MessageActions(p) => handler.handle_message_actions(ctx, p).await,
            Interaction::ViewClosed(p) => handler.handle_view_closed(ctx, p).await,
            Interaction::ViewSubmission(p) => handler.handle_view_submission(ctx, p).await,
        }
    }
}

/// Implement whichever kinds you care about; the rest are ignored.
#[async_trait]
pub trait InteractivityHandler: Send + Sync {
    async fn handle_block_actions(&self, _ctx: &Context, _payload: BlockActions) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_message_actions(
        &self,
        _ctx: &Context,
        _payload: MessageActions,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_view_closed(&self, _ctx: &Context, _payload: ViewClosed) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle_view_submission(
        &self,
        _ctx: &Context,
        _payload: ViewSubmission,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
