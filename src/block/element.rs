//! Interactive and non-interactive elements nested inside blocks. Each block
//! only accepts certain elements, which is what the per-block sum types encode.

use super::Text;
use serde::{ser::SerializeStruct, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: Text,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

impl Button {
    pub fn new<T: ToString>(text: Text, value: T) -> Self {
        Button {
            text,
            value: value.to_string(),
            action_id: None,
            url: None,
            style: None,
        }
    }

    pub fn with_action_id<T: ToString>(mut self, action_id: T) -> Self {
        self.action_id = Some(action_id.to_string());
        self
    }

    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// The element form of an image, as opposed to [super::ImageBlock].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub image_url: String,
    pub alt_text: String,
}

impl Image {
    pub fn new<T: ToString, U: ToString>(image_url: T, alt_text: U) -> Self {
        Image {
            image_url: image_url.to_string(),
            alt_text: alt_text.to_string(),
        }
    }
}

/// A choice within selects and checkbox groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionObject {
    pub text: Text,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkboxes {
    pub options: Vec<OptionObject>,
    pub action_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticSelect {
    pub placeholder: Text,
    pub options: Vec<OptionObject>,
    pub action_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlainTextInput {
    pub multiline: bool,
    pub action_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    pub focus_on_load: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionAccessory {
    Button(Button),
    Image(Image),
    StaticSelect(StaticSelect),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionsElement {
    Button(Button),
    Checkboxes(Checkboxes),
    StaticSelect(StaticSelect),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    PlainTextInput(PlainTextInput),
    StaticSelect(StaticSelect),
    Checkboxes(Checkboxes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextElement {
    Text(Text),
    Image(Image),
}

// Text already carries its own tag, so only images need one adding.
impl Serialize for ContextElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ContextElement::Text(t) => t.serialize(serializer),
            ContextElement::Image(img) => {
                let mut state = serializer.serialize_struct("Image", 3)?;
                state.serialize_field("type", "image")?;
                state.serialize_field("image_url", &img.image_url)?;
                state.serialize_field("alt_text", &img.alt_text)?;
                state.end()
            }
        }
    }
}
