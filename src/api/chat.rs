//! Post, update and delete messages, including direct messages from the bot.

use super::{error::ApiError, users::User, Acknowledged, SlackClient};
use crate::block::{Attachment, Block};
use serde::{Deserialize, Serialize};

/// A message as posted through the Web API, as opposed to a response to a
/// slash command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Rendered on its own without blocks, and used for notifications with
    /// them.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl ChatMessage {
    pub fn text<T: ToString>(text: T) -> Self {
        ChatMessage {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn blocks(blocks: Vec<Block>) -> Self {
        ChatMessage {
            blocks,
            ..Default::default()
        }
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

/// Where a message ended up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Posted {
    pub channel: String,
    pub ts: String,
}

/// <https://api.slack.com/methods/chat.postMessage#args>
#[derive(Serialize)]
struct PostRequest<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a ChatMessage,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Deserialize)]
struct PostResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    #[serde(flatten)]
    posted: Posted,
}

/// <https://api.slack.com/methods/chat.update#args>
#[derive(Serialize)]
struct UpdateRequest<'a> {
    channel: &'a str,
    ts: &'a str,
    #[serde(flatten)]
    message: &'a ChatMessage,
}

/// <https://api.slack.com/methods/chat.delete#args>
#[derive(Serialize)]
struct DeleteRequest<'a> {
    channel: &'a str,
    ts: &'a str,
}

/// <https://api.slack.com/methods/conversations.open#args>
#[derive(Serialize)]
struct OpenRequest<'a> {
    users: &'a str,
}

#[derive(Deserialize)]
struct OpenResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    channel: ChannelMeta,
}

#[derive(Deserialize)]
struct ChannelMeta {
    #[serde(default)]
    id: String,
}

impl SlackClient {
    pub async fn post_message(&self, channel: &str, msg: &ChatMessage) -> Result<Posted, ApiError> {
        let res: PostResponse = Self::call(self.post("/chat.postMessage").json(&PostRequest {
            channel,
            message: msg,
        }))
        .await?;

        Ok(res.posted)
    }

    /// Message a user directly from the bot, opening the conversation first
    /// if we haven't before.
    pub async fn post_direct_message(
        &self,
        user: &User,
        msg: &ChatMessage,
    ) -> Result<Posted, ApiError> {
        let channel = self.open_dm_channel(user).await?;

        self.post_message(&channel, msg).await
    }

    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        msg: &ChatMessage,
    ) -> Result<(), ApiError> {
        let _: Acknowledged = Self::call(self.post("/chat.update").json(&UpdateRequest {
            channel,
            ts,
            message: msg,
        }))
        .await?;

        Ok(())
    }

    pub async fn delete_message(&self, channel: &str, ts: &str) -> Result<(), ApiError> {
        let _: Acknowledged =
            Self::call(self.post("/chat.delete").json(&DeleteRequest { channel, ts })).await?;

        Ok(())
    }

    /// The direct message channel with `user`, remembered on the cached user
    /// once known.
    async fn open_dm_channel(&self, user: &User) -> Result<String, ApiError> {
        let known = user
            .dm_channel
            .clone()
            .or_else(|| self.users_by_id.get(&user.id).and_then(|u| u.dm_channel));
        if let Some(channel) = known {
            return Ok(channel);
        }

        let res: OpenResponse =
            Self::call(self.post("/conversations.open").json(&OpenRequest { users: &user.id }))
                .await?;

        if res.channel.id.is_empty() {
            return Err(ApiError::NotFound(format!("DM channel with {}", user.id)));
        }

        self.remember(&User {
            dm_channel: Some(res.channel.id.clone()),
            ..user.clone()
        });

        Ok(res.channel.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::tests::client, block::Text};
    use mockito::Matcher;
    use serde_json::json;

    fn user() -> User {
        User {
            id: "U1".into(),
            profile: crate::api::users::Profile {
                email: "ada@example.com".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_serialize_post_request() {
        let msg = ChatMessage::blocks(vec![Block::header("Hi")])
            .in_thread("1.2")
            .with_attachment(Attachment {
                blocks: vec![Block::Divider],
                color: None,
            });

        assert_eq!(
            serde_json::to_value(PostRequest {
                channel: "C1",
                message: &msg
            })
            .unwrap(),
            json!({
                "channel": "C1",
                "blocks": [{"type": "header", "text": {"type": "plain_text", "text": "Hi", "emoji": true}}],
                "attachments": [{"blocks": [{"type": "divider"}]}],
                "thread_ts": "1.2"
            })
        );
    }

    #[tokio::test]
    async fn test_post_message() {
        let mut srv = mockito::Server::new_async().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::Json(json!({"channel": "C1", "text": "hello"})))
            .with_body(r#"{"ok": true, "channel": "C1", "ts": "1503435956.000247", "message": {}}"#)
            .create_async()
            .await;

        let posted = client(srv.url())
            .post_message("C1", &ChatMessage::text("hello"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            posted,
            Posted {
                channel: "C1".into(),
                ts: "1503435956.000247".into()
            }
        );
    }

    #[tokio::test]
    async fn test_post_message_error() {
        let mut srv = mockito::Server::new_async().await;
        srv.mock("POST", "/chat.postMessage")
            .with_body(r#"{"ok": false, "error": "not_in_channel"}"#)
            .create_async()
            .await;

        let res = client(srv.url())
            .post_message("C1", &ChatMessage::text("hello"))
            .await;

        assert!(matches!(res, Err(ApiError::Response(e)) if e == "not_in_channel"));
    }

    #[tokio::test]
    async fn test_direct_message_opens_channel_once() {
        let mut srv = mockito::Server::new_async().await;
        let open = srv
            .mock("POST", "/conversations.open")
            .match_body(Matcher::Json(json!({"users": "U1"})))
            .with_body(r#"{"ok": true, "channel": {"id": "D1"}}"#)
            .expect(1)
            .create_async()
            .await;
        let post = srv
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({"channel": "D1"})))
            .with_body(r#"{"ok": true, "channel": "D1", "ts": "1.1"}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client(srv.url());
        let msg = ChatMessage::blocks(vec![Block::text(Text::mrkdwn("*hi*"))]);

        client.post_direct_message(&user(), &msg).await.unwrap();
        let posted = client.post_direct_message(&user(), &msg).await.unwrap();

        open.assert_async().await;
        post.assert_async().await;
        assert_eq!(posted.channel, "D1");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let mut srv = mockito::Server::new_async().await;
        let update = srv
            .mock("POST", "/chat.update")
            .match_body(Matcher::Json(
                json!({"channel": "C1", "ts": "1.2", "text": "edited"}),
            ))
            .with_body(r#"{"ok": true, "channel": "C1", "ts": "1.2"}"#)
            .create_async()
            .await;
        let delete = srv
            .mock("POST", "/chat.delete")
            .match_body(Matcher::Json(json!({"channel": "C1", "ts": "1.2"})))
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = client(srv.url());
        client
            .update_message("C1", "1.2", &ChatMessage::text("edited"))
            .await
            .unwrap();
        client.delete_message("C1", "1.2").await.unwrap();

        update.assert_async().await;
        delete.assert_async().await;
    }
}
