use super::Block;
use serde::{Serialize, Serializer};

/// Secondary content rendered beneath a message with a coloured bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Good,
    Warning,
    Danger,
    Rgb(u8, u8, u8),
}

impl Color {
    /// ```
    /// use iris::block::Color;
    /// assert_eq!(Color::Rgb(0x1d, 0x9b, 0xd1).to_wire(), "1D9BD1");
    /// ```
    pub fn to_wire(self) -> String {
        match self {
            Color::Good => "good".into(),
            Color::Warning => "warning".into(),
            Color::Danger => "danger".into(),
            Color::Rgb(r, g, b) => hex::encode_upper([r, g, b]),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Text;
    use serde_json::json;

    #[test]
    fn test_attachment() {
        let a = Attachment {
            blocks: vec![Block::text(Text::plain("careful"))],
            color: Some(Color::Warning),
        };

        assert_eq!(
            serde_json::to_value(a).unwrap(),
            json!({
                "blocks": [{"type": "section", "text": {"type": "plain_text", "text": "careful", "emoji": false}}],
                "color": "warning"
            })
        );
    }

    #[test]
    fn test_rgb() {
        assert_eq!(Color::Rgb(0, 0, 0).to_wire(), "000000");
        assert_eq!(Color::Rgb(255, 10, 171).to_wire(), "FF0AAB");
    }
}
