//! Helpers around the Web API's use of OAuth Bearer Authentication.

use std::fmt;

/// A newtype wrapper around bot access tokens.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct AccessToken(pub String);

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Convert an access token to a `Bearer` `Authorization` header value.
pub fn to_auth_header_val(t: &AccessToken) -> String {
    format!("Bearer {}", t.0)
}
