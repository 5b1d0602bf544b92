//! Modals and the home tab.
//!
//! A view's `private_metadata` is sealed with the client's
//! [MetadataCodec](crate::secret::MetadataCodec) on the way out; open it again
//! from a submission with [SlackClient::open_private_metadata].

use super::{error::ApiError, Acknowledged, SlackClient};
use crate::{
    block::{Block, Text},
    server::props::Props,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Modal,
    Home,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    #[serde(rename = "type")]
    pub kind: ViewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<Text>,
    /// Sealed separately, see [WireView].
    #[serde(skip)]
    pub private_metadata: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_on_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_disabled: Option<bool>,
}

impl View {
    /// Modal titles must be plain text.
    pub fn modal<T: ToString>(title: T, blocks: Vec<Block>) -> Self {
        View {
            title: Some(Text::plain(title)),
            ..View::home(blocks)
        }
        .of_kind(ViewKind::Modal)
    }

    pub fn home(blocks: Vec<Block>) -> Self {
        View {
            kind: ViewKind::Home,
            title: None,
            blocks,
            close: None,
            submit: None,
            private_metadata: Vec::new(),
            callback_id: None,
            clear_on_close: None,
            notify_on_close: None,
            external_id: None,
            submit_disabled: None,
        }
    }

    fn of_kind(mut self, kind: ViewKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_submit<T: ToString>(mut self, label: T) -> Self {
        self.submit = Some(Text::plain(label));
        self
    }

    pub fn with_close<T: ToString>(mut self, label: T) -> Self {
        self.close = Some(Text::plain(label));
        self
    }

    pub fn with_callback_id<T: ToString>(mut self, id: T) -> Self {
        self.callback_id = Some(id.to_string());
        self
    }

    /// Ask for a `view_closed` interaction when the user dismisses this.
    pub fn notify_on_close(mut self) -> Self {
        self.notify_on_close = Some(true);
        self
    }

    pub fn with_private_metadata<T: Into<Vec<u8>>>(mut self, metadata: T) -> Self {
        self.private_metadata = metadata.into();
        self
    }
}

/// A view as sent, with its metadata sealed.
#[derive(Serialize)]
struct WireView<'a> {
    #[serde(flatten)]
    view: &'a View,
    #[serde(skip_serializing_if = "String::is_empty")]
    private_metadata: String,
}

/// <https://api.slack.com/methods/views.open#args>
#[derive(Serialize)]
struct OpenRequest<'a> {
    trigger_id: &'a str,
    view: WireView<'a>,
}

/// <https://api.slack.com/methods/views.publish#args>
#[derive(Serialize)]
struct PublishRequest<'a> {
    user_id: &'a str,
    view: WireView<'a>,
}

/// <https://api.slack.com/methods/views.update#args>
#[derive(Serialize)]
struct UpdateRequest<'a> {
    view_id: &'a str,
    view: WireView<'a>,
}

#[derive(Deserialize)]
struct ViewResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    view: Props,
}

impl SlackClient {
    fn wire<'a>(&self, view: &'a View) -> Result<WireView<'a>, ApiError> {
        let private_metadata = if view.private_metadata.is_empty() {
            String::new()
        } else {
            self.metadata.encode(&view.private_metadata)?
        };

        Ok(WireView {
            view,
            private_metadata,
        })
    }

    /// Undo the sealing applied to a view's `private_metadata` when we sent it.
    pub fn open_private_metadata(&self, encoded: &str) -> Result<Vec<u8>, ApiError> {
        Ok(self.metadata.decode(encoded)?)
    }

    /// Open a modal in response to an interaction. Returns the new view's id.
    pub async fn open_view(&self, trigger_id: &str, view: &View) -> Result<String, ApiError> {
        let res: ViewResponse = Self::call(self.post("/views.open").json(&OpenRequest {
            trigger_id,
            view: self.wire(view)?,
        }))
        .await?;

        res.view
            .str("id")
            .map(ToOwned::to_owned)
            .map_err(|e| ApiError::NotFound(format!("view id: {}", e)))
    }

    pub async fn publish_view(&self, user_id: &str, view: &View) -> Result<(), ApiError> {
        let _: Acknowledged = Self::call(self.post("/views.publish").json(&PublishRequest {
            user_id,
            view: self.wire(view)?,
        }))
        .await?;

        Ok(())
    }

    pub async fn publish_home_view(&self, user_id: &str, blocks: Vec<Block>) -> Result<(), ApiError> {
        self.publish_view(user_id, &View::home(blocks)).await
    }

    pub async fn update_view(&self, view_id: &str, view: &View) -> Result<(), ApiError> {
        let _: Acknowledged = Self::call(self.post("/views.update").json(&UpdateRequest {
            view_id,
            view: self.wire(view)?,
        }))
        .await?;

        Ok(())
    }
}
