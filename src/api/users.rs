//! Look up workspace members, memoising what we learn.

use super::{error::ApiError, SlackClient};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tz_offset: i32,
    #[serde(default)]
    pub profile: Profile,
    /// The bot's direct message channel with this user, once opened.
    #[serde(skip)]
    pub dm_channel: Option<String>,
}

/// <https://api.slack.com/methods/users.lookupByEmail#args>
#[derive(Serialize)]
struct LookupRequest<'a> {
    email: &'a str,
}

/// <https://api.slack.com/methods/users.info#args>
#[derive(Serialize)]
struct InfoRequest<'a> {
    user: &'a str,
}

#[derive(Deserialize)]
struct UserResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(default)]
    user: User,
}

impl SlackClient {
    /// Find a user by their email address, from cache if we've seen them.
    pub async fn lookup_user_by_email(&self, email: &str) -> Result<User, ApiError> {
        if let Some(user) = self.users_by_email.get(email) {
            return Ok(user);
        }

        let res: UserResponse =
            Self::call(self.get("/users.lookupByEmail").query(&LookupRequest { email })).await?;

        if res.user.id.is_empty() {
            return Err(ApiError::NotFound(format!("user with email {}", email)));
        }

        self.remember(&res.user);
        Ok(res.user)
    }

    /// Find a user by id, from cache if we've seen them. Users without an
    /// email (bots, mostly) count as not found.
    pub async fn user_info(&self, id: &str) -> Result<User, ApiError> {
        if let Some(user) = self.users_by_id.get(id) {
            return Ok(user);
        }

        let res: UserResponse =
            Self::call(self.get("/users.info").query(&InfoRequest { user: id })).await?;

        if res.user.id.is_empty() || res.user.profile.email.is_empty() {
            return Err(ApiError::NotFound(format!("user {}", id)));
        }

        self.remember(&res.user);
        Ok(res.user)
    }

    /// Populate both caches with `user`.
    pub(super) fn remember(&self, user: &User) {
        let keys = [
            (&self.users_by_id, &user.id),
            (&self.users_by_email, &user.profile.email),
        ];

        for (cache, key) in keys {
            if let Err(e) = cache.set(key, user.clone()) {
                debug!("Not caching user {}: {}", user.id, e);
            }
        }
    }
}
