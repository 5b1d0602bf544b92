//! An outbound client for the platform's Web API: users, messages, views.
//!
//! Requests authenticate with a bot access token. Every response shares an
//! untagged `ok`/`error` envelope, see [ApiResult].

pub mod auth;
pub mod chat;
pub mod emoji;
pub mod error;
pub mod users;
pub mod view;

use crate::{
    cache::{Cache, LruCache},
    secret::MetadataCodec,
};
use auth::{to_auth_header_val, AccessToken};
use error::ApiError;
use serde::{de::DeserializeOwned, Deserialize};
use std::{sync::Arc, time::Duration};
use users::User;

/// The base URL of the API.
pub const API_BASE: &str = "https://slack.com/api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

/// A client holding a connection pool internally, as per [reqwest::Client],
/// plus caches of users looked up so far. Cheap to share behind an [Arc].
pub struct SlackClient {
    base_url: String,
    token: AccessToken,
    timeout: Duration,
    http: reqwest::Client,
    users_by_email: Arc<dyn Cache<User>>,
    users_by_id: Arc<dyn Cache<User>>,
    metadata: MetadataCodec,
}

impl SlackClient {
    pub fn new(token: AccessToken) -> Self {
        SlackClient {
            base_url: API_BASE.to_owned(),
            token,
            timeout: DEFAULT_TIMEOUT,
            http: reqwest::Client::new(),
            users_by_email: Arc::new(LruCache::new(DEFAULT_CACHE_CAPACITY)),
            users_by_id: Arc::new(LruCache::new(DEFAULT_CACHE_CAPACITY)),
            metadata: MetadataCodec::random(),
        }
    }

    pub fn with_base_url<T: ToString>(mut self, base_url: T) -> Self {
        self.base_url = base_url.to_string().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the default in-memory caches, e.g. with ones shared between
    /// processes.
    pub fn with_caches(
        mut self,
        by_email: Arc<dyn Cache<User>>,
        by_id: Arc<dyn Cache<User>>,
    ) -> Self {
        self.users_by_email = by_email;
        self.users_by_id = by_id;
        self
    }

    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        self.with_caches(
            Arc::new(LruCache::new(capacity)),
            Arc::new(LruCache::new(capacity)),
        )
    }

    pub fn with_metadata_codec(mut self, codec: MetadataCodec) -> Self {
        self.metadata = codec;
        self
    }

    /// Create a GET request to any endpoint, handling authentication.
    fn get<T: ToString>(&self, path: T) -> reqwest::RequestBuilder {
        self.http
            .get(self.base_url.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
            .timeout(self.timeout)
    }

    /// Create a POST request to any endpoint, handling authentication.
    fn post<T: ToString>(&self, path: T) -> reqwest::RequestBuilder {
        self.http
            .post(self.base_url.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
            .timeout(self.timeout)
    }

    /// Send a request and unwrap the `ok`/`error` envelope of its response.
    async fn call<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let res = req.send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        match res.json::<ApiResult<T>>().await? {
            ApiResult::Ok(x) => Ok(x),
            ApiResult::Err(e) => Err(ApiError::Response(e.error)),
        }
    }
}

/// The API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "ok": true,
///     "user": {}
/// }
/// ```
///
/// ```json
/// {
///     "ok": false,
///     "error": "invalid_auth"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ApiResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

/// The universal response in case of an unsuccessful request.
// The `ok` field is checked here, and must be checked on every success type
// too with `crate::de::only_true`, else an error would deserialize as an
// otherwise empty success.
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_false")]
    ok: bool,
    #[serde(default)]
    pub error: String,
}

/// A success carrying nothing else.
#[derive(Deserialize)]
struct Acknowledged {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn client(base_url: String) -> SlackClient {
        SlackClient::new(AccessToken("xoxb-foo".into())).with_base_url(base_url)
    }

    #[test]
    fn test_api_result() {
        let ok: ApiResult<Acknowledged> = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(matches!(ok, ApiResult::Ok(_)));

        let err: ApiResult<Acknowledged> =
            serde_json::from_str(r#"{"ok": false, "error": "invalid_auth"}"#).unwrap();
        assert!(matches!(err, ApiResult::Err(e) if e.error == "invalid_auth"));
    }

    #[tokio::test]
    async fn test_status_error() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("POST", "/chat.delete")
            .with_status(500)
            .create_async()
            .await;

        let res = client(srv.url()).delete_message("C1", "1.2").await;

        mock.assert_async().await;
        assert!(matches!(res, Err(ApiError::Status(500))));
    }

    #[tokio::test]
    async fn test_bearer_auth() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("POST", "/chat.delete")
            .match_header("authorization", "Bearer xoxb-foo")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        client(format!("{}/", srv.url()))
            .delete_message("C1", "1.2")
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
