//! An inbound webhook gateway for Slack apps, plus the small outbound client
//! most apps end up needing to answer.
//!
//! Register slash command, event subscription, and interactivity routes on a
//! [server::GatewayBuilder]; every request is checked against the app's
//! signing secret before a handler sees it. See [api::SlackClient] for the
//! Web API and [hook::Notifier] for incoming webhooks.

pub mod api;
pub mod block;
pub mod cache;
pub mod config;
mod de;
pub mod hook;
pub mod secret;
pub mod server;
