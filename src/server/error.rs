use crate::block::Message;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// The request didn't come from the platform, or came too long ago.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    StaleTimestamp { timestamp: i64, now: i64 },
    SignatureMismatch,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::StaleTimestamp { timestamp, now } => write!(
                f,
                "Request timestamp {} is outside the allowed window (now {})",
                timestamp, now
            ),
            AuthFailure::SignatureMismatch => write!(f, "Request signature does not match"),
        }
    }
}

/// The request couldn't be read, classified, or decoded.
#[derive(Debug)]
pub enum MalformedRequest {
    MissingHeader(String),
    InvalidHeader(String),
    UnsupportedContentType(String),
    NotJson(serde_json::Error),
    NotForm(serde_urlencoded::de::Error),
    MissingDiscriminator,
    InvalidDiscriminator,
    MissingChallenge,
    MissingPayload,
    UnexpectedEncoding { expected: &'static str },
    Decode { what: &'static str, reason: String },
}

impl fmt::Display for MalformedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRequest::MissingHeader(h) => write!(f, "Missing `{}` header", h),
            MalformedRequest::InvalidHeader(h) => write!(f, "Invalid `{}` header", h),
            MalformedRequest::UnsupportedContentType(ct) => {
                write!(f, "Unsupported content type: {}", ct)
            }
            MalformedRequest::NotJson(e) => write!(f, "Body is not a JSON object: {}", e),
            MalformedRequest::NotForm(e) => write!(f, "Body is not a valid form: {}", e),
            MalformedRequest::MissingDiscriminator => write!(f, "Missing `type` field"),
            MalformedRequest::InvalidDiscriminator => {
                write!(f, "Field `type` is not a non-empty string")
            }
            MalformedRequest::MissingChallenge => write!(f, "Missing `challenge` field"),
            MalformedRequest::MissingPayload => write!(f, "Missing `payload` form field"),
            MalformedRequest::UnexpectedEncoding { expected } => {
                write!(f, "Expected a {} body", expected)
            }
            MalformedRequest::Decode { what, reason } => {
                write!(f, "Failed to decode {}: {}", what, reason)
            }
        }
    }
}

/// Sum type of every way the gateway itself can refuse a request. Handler
/// failures aren't here; those never escape a handler's own response.
#[derive(Debug)]
pub enum GatewayError {
    Auth(AuthFailure),
    Malformed(MalformedRequest),
    NotFound,
    /// An event envelope we decoded but have nowhere to send.
    UnsupportedEvent(String),
    /// Interactivity traffic of a kind we don't understand.
    UnknownInteraction(String),
    /// Too many background handlers already in flight.
    Saturated,
}

impl From<AuthFailure> for GatewayError {
    fn from(e: AuthFailure) -> Self {
        GatewayError::Auth(e)
    }
}

impl From<MalformedRequest> for GatewayError {
    fn from(e: MalformedRequest) -> Self {
        GatewayError::Malformed(e)
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) => StatusCode::FORBIDDEN,
            GatewayError::Malformed(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            // Answered with success so the platform doesn't keep retrying
            // something we'll never act on.
            GatewayError::UnsupportedEvent(_) => StatusCode::OK,
            GatewayError::UnknownInteraction(_) => StatusCode::BAD_REQUEST,
            GatewayError::Saturated => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Auth(e) => write!(f, "I can't verify your request: {}", e),
            GatewayError::Malformed(e) => write!(f, "I can't understand your request: {}", e),
            GatewayError::NotFound => write!(f, "Nothing is registered here"),
            GatewayError::UnsupportedEvent(t) => {
                write!(f, "I don't know what to do with event '{}'", t)
            }
            GatewayError::UnknownInteraction(t) => {
                write!(f, "I don't know interactivity payload type '{}'", t)
            }
            GatewayError::Saturated => write!(f, "I'm too busy right now, try again shortly"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(Message::ephemeral(self))).into_response()
    }
}

/// Mistakes in how the gateway was put together. These surface from
/// [super::GatewayBuilder::build], before anything is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptySecret,
    DuplicateRoute { method: Method, path: String },
    InvalidPath(String),
    ZeroBackgroundLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySecret => write!(f, "Signing secret must not be empty"),
            ConfigError::DuplicateRoute { method, path } => {
                write!(f, "Route {} {} is registered more than once", method, path)
            }
            ConfigError::InvalidPath(p) => write!(f, "Route path must start with `/`: {}", p),
            ConfigError::ZeroBackgroundLimit => {
                write!(f, "At least one background handler must be allowed")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(
            GatewayError::Auth(AuthFailure::SignatureMismatch).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::Malformed(MalformedRequest::MissingPayload).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::UnsupportedEvent("app_rate_limited".into()).status(),
            StatusCode::OK
        );
        assert_eq!(GatewayError::Saturated.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            GatewayError::UnknownInteraction("shortcut".into()).to_string(),
            "I don't know interactivity payload type 'shortcut'"
        );
        assert_eq!(
            ConfigError::DuplicateRoute {
                method: Method::POST,
                path: "/slash".into()
            }
            .to_string(),
            "Route POST /slash is registered more than once"
        );
    }
}
