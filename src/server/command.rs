//! Slash commands arrive as flat url-encoded forms and are answered
//! synchronously: whatever the handler returns is the reply.
//!
//! <https://api.slack.com/interactivity/slash-commands#app_command_handling>

use super::{context::Context, error::MalformedRequest, payload::Form};
use crate::block::Message;
use async_trait::async_trait;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use url::Url;

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    /// The command itself, e.g. `/echo`.
    #[serde(default)]
    pub command: String,
    /// Where delayed responses can be posted for up to 30 minutes.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub response_url: Option<Url>,
    #[serde(default)]
    pub team_domain: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub enterprise_id: String,
    #[serde(default)]
    pub api_app_id: String,
    /// Everything after the command.
    #[serde(default)]
    pub text: String,
    /// Deprecated verification token. Signatures supersede it.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

impl SlashCommand {
    pub fn decode(form: &Form) -> Result<Self, MalformedRequest> {
        form.decode("slash command")
    }
}

#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// An error here is shown to the invoking user as an ephemeral message.
    async fn handle_command(&self, ctx: &Context, cmd: SlashCommand) -> anyhow::Result<Message>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::payload::{classify, Envelope};

    fn form(body: &str) -> Form {
        match classify(Some("application/x-www-form-urlencoded"), body.as_bytes()).unwrap() {
            Envelope::Command(form) => form,
            other => panic!("unexpected envelope: {:?}", other),
        }
    }

    #[test]
    fn test_decode() {
        let body = "token=gIkuvaNzQIHg97ATvDxqgjtO&team_id=T0001&team_domain=example\
            &enterprise_id=E0001&channel_id=C2147483705&channel_name=test&user_id=U2147483697\
            &user_name=Steve&command=%2Fweather&text=94070\
            &response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2F1234%2F5678\
            &trigger_id=13345224609.738474920.8088930838d88f008e0&api_app_id=A123456";

        let cmd = SlashCommand::decode(&form(body)).unwrap();

        assert_eq!(cmd.command, "/weather");
        assert_eq!(cmd.text, "94070");
        assert_eq!(cmd.user_id, "U2147483697");
        assert_eq!(cmd.channel_name, "test");
        assert_eq!(
            cmd.response_url.unwrap().as_str(),
            "https://hooks.slack.com/commands/1234/5678"
        );
        assert_eq!(cmd.api_app_id, "A123456");
    }

    #[test]
    fn test_sparse_and_empty_fields() {
        let cmd = SlashCommand::decode(&form("text=hello&user_id=U1&channel_id=C1&response_url="))
            .unwrap();

        assert_eq!(cmd.text, "hello");
        assert_eq!(cmd.response_url, None);
        assert!(cmd.command.is_empty());
    }

    #[test]
    fn test_bad_response_url() {
        assert!(matches!(
            SlashCommand::decode(&form("text=hi&response_url=not%20a%20url")),
            Err(MalformedRequest::Decode { .. })
        ));
    }
}
