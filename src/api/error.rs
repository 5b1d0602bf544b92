use crate::secret::SecretError;
use std::fmt;

/// Sum type representing every way a Web API call can fail.
#[derive(Debug)]
pub enum ApiError {
    RequestFailed(reqwest::Error),
    /// A non-2xx HTTP status.
    Status(u16),
    /// `ok: false`, with the platform's error code.
    Response(String),
    /// The call succeeded but what we asked for isn't there.
    NotFound(String),
    Metadata(SecretError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestFailed(e)
    }
}

impl From<SecretError> for ApiError {
    fn from(e: SecretError) -> Self {
        ApiError::Metadata(e)
    }
}

impl ApiError {
    /// Whether the token was refused.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Response(e) if e == "invalid_auth" || e == "not_authed")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed(e) => write!(f, "API request failed: {}", e),
            ApiError::Status(s) => write!(f, "API responded with status {}", s),
            ApiError::Response(e) => write!(f, "API returned error: {}", e),
            ApiError::NotFound(what) => write!(f, "Not found: {}", what),
            ApiError::Metadata(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}
