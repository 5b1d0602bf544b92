//! An echo bot built on the gateway. Slash commands are echoed straight back;
//! messages are echoed to their channel and cleaned up shortly after.

use anyhow::Context as _;
use async_trait::async_trait;
use axum::{http::Method, response::IntoResponse};
use dotenvy::dotenv;
use iris::{
    api::{chat::ChatMessage, emoji::random_emoji, SlackClient},
    block::Message,
    cache::{Cache, LruCache},
    config::Config,
    server::{
        interaction::{BlockActions, ViewSubmission},
        Context, EventCallback, EventHandler, Gateway, HttpRequest, InteractivityHandler, Route,
        SlashCommand, SlashCommandHandler,
    },
};
use std::{sync::Arc, time::Duration};
use tokio::signal;
use tracing::{debug, info, warn};

/// How long an echo stays up before we delete it.
const ECHO_LINGER: Duration = Duration::from_secs(3);

/// Recently seen event ids, for dropping the platform's redeliveries.
const SEEN_EVENTS: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let has_dotenv = dotenv().is_ok();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(config.log_level)
        .compact()
        .init();

    if !has_dotenv {
        warn!("No .env found");
    }

    let slack = Arc::new(
        SlackClient::new(config.access_token.clone()).with_base_url(&config.api_base),
    );

    gateway(&config, slack, ECHO_LINGER)?
        .serve(async {
            signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("Failed to start server")
}

fn gateway(config: &Config, slack: Arc<SlackClient>, linger: Duration) -> anyhow::Result<Gateway> {
    let gateway = Gateway::builder(config.signing_secret.clone())
        .listen_port(config.port)
        .route(Route::http(Method::GET, "/health", health))
        .route(Route::slash_command("/slash", EchoCommand))
        .route(Route::event_subscriptions("/event", Echo::new(slack, linger)))
        .route(Route::interactivity("/interactive", LogInteractions))
        .build()?;

    Ok(gateway)
}

async fn health(_: HttpRequest) -> axum::response::Response {
    ().into_response()
}

struct EchoCommand;

#[async_trait]
impl SlashCommandHandler for EchoCommand {
    async fn handle_command(&self, _: &Context, cmd: SlashCommand) -> anyhow::Result<Message> {
        if cmd.text.trim().is_empty() {
            return Ok(Message::ephemeral(format!("Try `{} something`.", cmd.command)));
        }

        Ok(Message::in_channel(cmd.text))
    }
}

struct Echo {
    slack: Arc<SlackClient>,
    seen: LruCache<()>,
    linger: Duration,
}

impl Echo {
    fn new(slack: Arc<SlackClient>, linger: Duration) -> Self {
        Echo {
            slack,
            seen: LruCache::new(SEEN_EVENTS),
            linger,
        }
    }

    /// Whether we've handled this event before, remembering it if not.
    fn seen(&self, event_id: &str) -> bool {
        if event_id.is_empty() {
            return false;
        }
        if self.seen.get(event_id).is_some() {
            return true;
        }
        if let Err(e) = self.seen.set(event_id, ()) {
            debug!("Not remembering event {}: {}", event_id, e);
        }

        false
    }
}

#[async_trait]
impl EventHandler for Echo {
    async fn handle_event(&self, ctx: &Context, callback: EventCallback) -> anyhow::Result<()> {
        if self.seen(&callback.event_id) {
            info!(event_id = %callback.event_id, retry = ?ctx.retry_num, "Dropping redelivered event");
            return Ok(());
        }

        let event = &callback.event;
        if event.kind()? != "message" {
            return Ok(());
        }
        if matches!(event.subtype()?, Some("bot_message" | "message_deleted")) {
            return Ok(());
        }

        let Some(user_id) = event.opt_str("user")? else {
            return Ok(());
        };
        if callback.authorizations.user_id() == Some(user_id) {
            return Ok(());
        }

        let user = self.slack.user_info(user_id).await?;
        let text = event.opt_str("text")?.unwrap_or_default();
        let channel = event.str("channel")?;

        let echo = ChatMessage::text(format!(
            "{} {} said: {}",
            random_emoji(),
            user.profile.real_name,
            text
        ));
        let posted = self.slack.post_message(channel, &echo).await?;

        tokio::time::sleep(self.linger).await;
        self.slack.delete_message(&posted.channel, &posted.ts).await?;

        Ok(())
    }
}

struct LogInteractions;

#[async_trait]
impl InteractivityHandler for LogInteractions {
    async fn handle_block_actions(&self, _: &Context, payload: BlockActions) -> anyhow::Result<()> {
        for action in payload.actions {
            info!(user = %payload.user.id, action_id = %action.action_id, value = ?action.value, "Block action");
        }

        Ok(())
    }

    async fn handle_view_submission(
        &self,
        _: &Context,
        payload: ViewSubmission,
    ) -> anyhow::Result<()> {
        info!(callback_id = ?payload.callback_id()?, "View submitted");

        Ok(())
    }
}
