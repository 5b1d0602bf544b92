//! Classify a raw request body into one of the envelope shapes the platform
//! sends, before anything is decoded into a strongly-typed payload.
//!
//! Three shapes share our listeners:
//!
//! - a JSON object with a `type` discriminator (event subscriptions, including
//!   the URL verification challenge),
//! - a form whose `payload` field holds such a JSON object (interactivity),
//! - a flat form (slash commands).

use super::{error::MalformedRequest, props::FieldError, props::Props};
use serde::de::DeserializeOwned;

/// The discriminator of the handshake used to confirm we own an endpoint.
pub const URL_VERIFICATION: &str = "url_verification";

#[derive(Debug, Clone, PartialEq)]
pub struct JsonEnvelope {
    pub kind: String,
    pub props: Props,
}

impl JsonEnvelope {
    fn from_slice(bytes: &[u8]) -> Result<Self, MalformedRequest> {
        let props: Props = serde_json::from_slice(bytes).map_err(MalformedRequest::NotJson)?;

        let kind = match props.str("type") {
            Ok(kind) if !kind.is_empty() => kind.to_owned(),
            Ok(_) | Err(FieldError::WrongType { .. }) => {
                return Err(MalformedRequest::InvalidDiscriminator)
            }
            Err(FieldError::Missing(_)) => return Err(MalformedRequest::MissingDiscriminator),
        };

        Ok(JsonEnvelope { kind, props })
    }

    /// Decode the whole envelope into a concrete payload type.
    pub fn decode<T: DeserializeOwned>(&self, what: &'static str) -> Result<T, MalformedRequest> {
        serde_json::from_value(serde_json::Value::Object(self.props.as_map().clone())).map_err(
            |e| MalformedRequest::Decode {
                what,
                reason: e.to_string(),
            },
        )
    }
}

/// A flat url-encoded form, kept alongside its raw bytes for typed decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    raw: Vec<u8>,
    pairs: Vec<(String, String)>,
}

impl Form {
    fn from_slice(bytes: &[u8]) -> Result<Self, MalformedRequest> {
        let pairs = serde_urlencoded::from_bytes(bytes).map_err(MalformedRequest::NotForm)?;

        Ok(Form {
            raw: bytes.to_vec(),
            pairs,
        })
    }

    /// The first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn decode<T: DeserializeOwned>(&self, what: &'static str) -> Result<T, MalformedRequest> {
        serde_urlencoded::from_bytes(&self.raw).map_err(|e| MalformedRequest::Decode {
            what,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Json(JsonEnvelope),
    Command(Form),
    Interactivity(JsonEnvelope),
}

impl Envelope {
    /// The `type` discriminator, where the shape has one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Envelope::Json(e) | Envelope::Interactivity(e) => Some(&e.kind),
            Envelope::Command(_) => None,
        }
    }

    /// `Some` when this is the verification handshake, holding the value to
    /// echo back.
    pub fn challenge(&self) -> Option<Result<&str, MalformedRequest>> {
        match self {
            Envelope::Json(e) | Envelope::Interactivity(e) if e.kind == URL_VERIFICATION => Some(
                e.props
                    .str("challenge")
                    .map_err(|_| MalformedRequest::MissingChallenge),
            ),
            _ => None,
        }
    }
}

enum Encoding {
    Json,
    Form,
}

/// Work out the body encoding from the `Content-Type` essence, falling back to
/// sniffing when there isn't one.
fn encoding(content_type: Option<&str>, body: &[u8]) -> Result<Encoding, MalformedRequest> {
    let Some(ct) = content_type else {
        let first = body.iter().find(|b| !b.is_ascii_whitespace());
        return Ok(match first {
            Some(b'{') => Encoding::Json,
            _ => Encoding::Form,
        });
    };

    let essence = ct.split(';').next().unwrap_or_default().trim();

    if essence.eq_ignore_ascii_case("application/json") {
        Ok(Encoding::Json)
    } else if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        Ok(Encoding::Form)
    } else {
        Err(MalformedRequest::UnsupportedContentType(ct.to_owned()))
    }
}

/// Classify the exact bytes we received. This must only be called on bodies
/// which have already been verified, if verification applies.
pub fn classify(content_type: Option<&str>, body: &[u8]) -> Result<Envelope, MalformedRequest> {
    match encoding(content_type, body)? {
        Encoding::Json => JsonEnvelope::from_slice(body).map(Envelope::Json),
        Encoding::Form => {
            let form = Form::from_slice(body)?;

            match form.get("payload") {
                Some(payload) => {
                    JsonEnvelope::from_slice(payload.as_bytes()).map(Envelope::Interactivity)
                }
                None => Ok(Envelope::Command(form)),
            }
        }
    }
}
