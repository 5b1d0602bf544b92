//! The platform's block API is its most modern, and lets us mix rich formatting
//! with foreign plaintext. This is our subset thereof, plus the [Message]
//! envelope used both for replies to slash commands and for the outbound chat
//! API.
//!
//! <https://api.slack.com/reference/block-kit/blocks>

mod attachment;
mod element;
pub mod mrkdwn;

pub use attachment::{Attachment, Color};
pub use element::{
    ActionsElement, Button, ButtonStyle, Checkboxes, ContextElement, Image, InputElement,
    OptionObject, PlainTextInput, SectionAccessory, StaticSelect,
};

use serde::Serialize;

/// Text objects. Headers, labels and placeholders only accept plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Text {
    #[serde(rename = "plain_text")]
    Plain { text: String, emoji: bool },
    /// "mrkdwn" is the platform's alternative to Markdown.
    ///
    /// <https://api.slack.com/reference/surfaces/formatting#basics>
    #[serde(rename = "mrkdwn")]
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain<T: ToString>(text: T) -> Self {
        Text::Plain {
            text: text.to_string(),
            emoji: false,
        }
    }

    /// Plain text in which emoji short-codes like `:wave:` are rendered.
    pub fn plain_emoji<T: ToString>(text: T) -> Self {
        Text::Plain {
            text: text.to_string(),
            emoji: true,
        }
    }

    pub fn mrkdwn<T: ToString>(text: T) -> Self {
        Text::Mrkdwn {
            text: text.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::Plain { text, .. } | Text::Mrkdwn { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section(Section),
    Divider,
    Image(ImageBlock),
    Context {
        elements: Vec<ContextElement>,
    },
    Actions {
        elements: Vec<ActionsElement>,
    },
    Input(Input),
}

impl Block {
    pub fn header<T: ToString>(text: T) -> Self {
        Block::Header {
            text: Text::plain_emoji(text),
        }
    }

    /// A section holding only text.
    pub fn text(text: Text) -> Self {
        Block::Section(Section::new(text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub text: Text,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessory: Option<SectionAccessory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

impl Section {
    pub fn new(text: Text) -> Self {
        Section {
            text,
            accessory: None,
            block_id: None,
        }
    }

    pub fn with_accessory(mut self, accessory: SectionAccessory) -> Self {
        self.accessory = Some(accessory);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    pub image_url: String,
    pub alt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
}

/// Input blocks only render inside views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    pub label: Text,
    pub element: InputElement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only visible to the user who triggered the interaction.
    Ephemeral,
    InChannel,
}

/// A message, either returned synchronously from a slash command or posted
/// through the outbound client. Empty fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    /// Rendered on its own without blocks, and used for notifications with
    /// them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_original: Option<bool>,
}

impl Message {
    pub fn text<T: ToString>(text: T) -> Self {
        Message {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn blocks(blocks: Vec<Block>) -> Self {
        Message {
            blocks,
            ..Default::default()
        }
    }

    /// The shape used for errors surfaced to users.
    pub fn ephemeral<T: ToString>(text: T) -> Self {
        Message {
            response_type: Some(ResponseType::Ephemeral),
            ..Message::text(text)
        }
    }

    pub fn in_channel<T: ToString>(text: T) -> Self {
        Message {
            response_type: Some(ResponseType::InChannel),
            ..Message::text(text)
        }
    }

    /// Notification text to accompany blocks.
    pub fn with_text<T: ToString>(mut self, text: T) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn in_thread<T: ToString>(mut self, ts: T) -> Self {
        self.thread_ts = Some(ts.to_string());
        self
    }
}
