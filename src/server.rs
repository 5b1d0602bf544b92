//! The inbound side: a gateway which verifies, classifies, and dispatches the
//! platform's webhooks to application handlers.
//!
//! Routes are registered up front on a [GatewayBuilder]. Slash commands are
//! answered with whatever their handler returns. Events and interactivity are
//! acknowledged straight away and handled in the background, bounded by
//! [GatewayBuilder::max_background_handlers].

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::Response,
    Router,
};
use dispatch::{BackgroundPool, Dispatcher, Inbound};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};

pub mod command;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod http;
pub mod interaction;
pub mod payload;
pub mod props;
pub mod route;
pub mod verify;

pub use command::{SlashCommand, SlashCommandHandler};
pub use context::Context;
pub use error::{ConfigError, GatewayError};
pub use event::{Event, EventCallback, EventHandler};
pub use http::{HttpHandler, HttpRequest};
pub use interaction::{Interaction, InteractivityHandler};
pub use route::Route;
pub use verify::SigningSecret;

pub const DEFAULT_LISTEN_PORT: u16 = 8080;
pub const DEFAULT_TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const DEFAULT_MAX_BACKGROUND_HANDLERS: usize = 256;
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GatewayBuilder {
    secret: SigningSecret,
    listen_port: u16,
    timestamp_header: String,
    signature_header: String,
    max_background_handlers: usize,
    handler_timeout: Duration,
    routes: Vec<Route>,
}

impl GatewayBuilder {
    pub fn listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    pub fn timestamp_header<T: ToString>(mut self, name: T) -> Self {
        self.timestamp_header = name.to_string();
        self
    }

    pub fn signature_header<T: ToString>(mut self, name: T) -> Self {
        self.signature_header = name.to_string();
        self
    }

    /// How many acknowledged requests may be handled at once. Beyond this,
    /// asynchronous requests are refused with 503 until capacity frees up.
    pub fn max_background_handlers(mut self, limit: usize) -> Self {
        self.max_background_handlers = limit;
        self
    }

    pub fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn build(self) -> Result<Gateway, ConfigError> {
        if self.secret.0.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        if self.max_background_handlers == 0 {
            return Err(ConfigError::ZeroBackgroundLimit);
        }

        let mut routes = route::RouteTable::new();
        for r in self.routes {
            routes.register(r)?;
        }

        let dispatcher = Dispatcher::new(
            routes,
            verify::Verifier::new(self.secret),
            self.timestamp_header,
            self.signature_header,
            BackgroundPool::new(self.max_background_handlers, self.handler_timeout),
        );

        Ok(Gateway {
            listen_port: self.listen_port,
            dispatcher: Arc::new(dispatcher),
        })
    }
}

/// A built gateway. Immutable; cloning shares the same routes and pool.
#[derive(Clone)]
pub struct Gateway {
    listen_port: u16,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    pub fn builder(secret: SigningSecret) -> GatewayBuilder {
        GatewayBuilder {
            secret,
            listen_port: DEFAULT_LISTEN_PORT,
            timestamp_header: DEFAULT_TIMESTAMP_HEADER.to_owned(),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_owned(),
            max_background_handlers: DEFAULT_MAX_BACKGROUND_HANDLERS,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            routes: Vec::new(),
        }
    }

    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    /// An axum router with tracing. Every request goes through our own route
    /// table, so the router itself has nothing but a fallback.
    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO));

        Router::new()
            .fallback(gateway_handler)
            .layer(trace_layer)
            .with_state(Arc::clone(&self.dispatcher))
    }

    /// Bind to `0.0.0.0` on the configured port and serve until `shutdown`
    /// resolves.
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.listen_port));
        let listener = TcpListener::bind(addr).await?;

        self.bind_and_serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn bind_and_serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn gateway_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatcher
        .serve(Inbound {
            method,
            uri,
            headers,
            body,
        })
        .await
}




#[cfg(test)]
mod tests_events {
    use super::{test_util::*, *};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::{
        collections::HashSet,
        sync::atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::{mpsc, Semaphore};
    use tower::ServiceExt;

    /// Reports every callback it sees, optionally after waiting on a gate.
    struct Recorder {
        seen: mpsc::UnboundedSender<EventCallback>,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Semaphore>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle_event(&self, _: &Context, callback: EventCallback) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.acquire().await?.forget();
            }

            self.seen.send(callback)?;
            Ok(())
        }
    }

    struct Setup {
        router: Router,
        seen: mpsc::UnboundedReceiver<EventCallback>,
        calls: Arc<AtomicUsize>,
    }

    fn setup(gate: Option<Arc<Semaphore>>, limit: usize) -> Setup {
        let (tx, rx) = mpsc::unbounded_channel();
        let calls = Arc::new(AtomicUsize::new(0));

        let router = builder()
            .max_background_handlers(limit)
            .route(Route::event_subscriptions(
                "/events",
                Recorder {
                    seen: tx,
                    calls: calls.clone(),
                    gate,
                },
            ))
            .build()
            .unwrap()
            .router();

        Setup {
            router,
            seen: rx,
            calls,
        }
    }

    fn message_event(id: &str, text: &str) -> String {
        serde_json::json!({
            "type": "event_callback",
            "team_id": "T1",
            "event_id": id,
            "event_time": 1_700_000_000,
            "event": {"type": "message", "channel": "C1", "user": "U1", "text": text}
        })
        .to_string()
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<EventCallback>) -> EventCallback {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("handler was never invoked")
            .unwrap()
    }

    #[tokio::test]
    async fn test_url_verification() {
        let mut s = setup(None, 8);
        let body = r#"{"token":"Jhj5dZrVaK7ZwHHjRyZWjbDl","challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P","type":"url_verification"}"#;

        let (status, body) = send(s.router, signed("/events", JSON, body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P");
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
        assert!(s.seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_url_verification_needs_challenge() {
        let s = setup(None, 8);

        let (status, _) = send(
            s.router,
            signed("/events", JSON, r#"{"type":"url_verification"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_url_verification_still_verified() {
        let s = setup(None, 8);
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("Content-Type", JSON)
            .body(axum::body::Body::from(
                r#"{"type":"url_verification","challenge":"c"}"#,
            ))
            .unwrap();

        let (status, _) = send(s.router, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_event_dispatched_after_ack() {
        let mut s = setup(None, 8);

        let mut req = signed("/events", JSON, &message_event("Ev1", "hello"));
        req.headers_mut()
            .insert("X-Slack-Retry-Num", "1".parse().unwrap());

        let (status, body) = send(s.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let cb = recv(&mut s.seen).await;
        assert_eq!(cb.event_id, "Ev1");
        assert_eq!(cb.event.str("text"), Ok("hello"));
        assert_eq!(cb.event_time, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_bot_message() {
        let mut s = setup(None, 8);
        let body = serde_json::json!({
            "type": "event_callback",
            "event_id": "Ev9",
            "event": {"type": "message", "subtype": "bot_message", "bot_id": "B1", "text": "beep"}
        })
        .to_string();

        let (status, _) = send(s.router, signed("/events", JSON, &body)).await;
        assert_eq!(status, StatusCode::OK);

        let cb = recv(&mut s.seen).await;
        assert_eq!(cb.event.subtype(), Ok(Some("bot_message")));
    }

    #[tokio::test]
    async fn test_unsupported_event_type() {
        let mut s = setup(None, 8);
        let body = r#"{"type":"app_rate_limited","team_id":"T1","minute_rate_limited":1518467820}"#;

        let (status, body) = send(s.router, signed("/events", JSON, body)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("app_rate_limited"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
        assert!(s.seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_event() {
        let s = setup(None, 8);

        let (status, _) = send(
            s.router,
            signed("/events", JSON, r#"{"type":"event_callback","event":{"text":"no type"}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_burst_is_acknowledged_before_handling() {
        const N: usize = 32;

        let gate = Arc::new(Semaphore::new(0));
        let mut s = setup(Some(gate.clone()), N);

        let mut acks = Vec::new();
        for i in 0..N {
            let req = signed("/events", JSON, &message_event(&format!("Ev{}", i), "burst"));
            acks.push(tokio::spawn(s.router.clone().oneshot(req)));
        }

        // Every request is answered while all handlers are still blocked.
        for ack in acks {
            let res = ack.await.unwrap().unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        gate.add_permits(N);

        let mut ids = HashSet::new();
        for _ in 0..N {
            ids.insert(recv(&mut s.seen).await.event_id);
        }

        assert_eq!(ids.len(), N);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(s.calls.load(Ordering::SeqCst), N);
        assert!(s.seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_saturated() {
        let gate = Arc::new(Semaphore::new(0));
        let mut s = setup(Some(gate.clone()), 1);

        let (status, _) = send(
            s.router.clone(),
            signed("/events", JSON, &message_event("Ev1", "first")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            s.router.clone(),
            signed("/events", JSON, &message_event("Ev2", "second")),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        gate.add_permits(1);
        assert_eq!(recv(&mut s.seen).await.event_id, "Ev1");
    }
}
