//! The request pipeline shared by every route: look up, verify, classify,
//! answer the handshake, then hand off to the route's adapter.

use super::{
    command::{SlashCommand, SlashCommandHandler},
    context::Context,
    error::{GatewayError, MalformedRequest},
    event::{EventCallback, EventHandler, EVENT_CALLBACK},
    http::HttpRequest,
    interaction::{Interaction, InteractivityHandler},
    payload::{self, Envelope},
    route::{Endpoint, Route, RouteTable},
    verify::{SignedRequest, Verifier},
};
use crate::block::Message;
use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Everything the gateway knows about one inbound request.
#[derive(Debug)]
pub struct Inbound {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Bounds how many acknowledged-but-unfinished handlers may run at once, and
/// how long each may take.
#[derive(Debug, Clone)]
pub struct BackgroundPool {
    permits: Arc<Semaphore>,
    limit: usize,
    timeout: Duration,
}

impl BackgroundPool {
    pub fn new(limit: usize, timeout: Duration) -> Self {
        BackgroundPool {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            timeout,
        }
    }

    /// Start `work` in the background, or refuse if the pool is full. Never
    /// waits, so the caller can always acknowledge promptly.
    pub fn submit<F>(&self, label: String, work: F) -> Result<(), GatewayError>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let permit = self.permits.clone().try_acquire_owned().map_err(|_| {
            warn!(route = %label, limit = self.limit, "Background handlers saturated");
            GatewayError::Saturated
        })?;

        let timeout = self.timeout;

        tokio::spawn(async move {
            // Held until the handler is finished one way or another.
            let _permit = permit;

            // A separate task, so a panic is reported here instead of
            // unwinding through us.
            let run = tokio::spawn(tokio::time::timeout(timeout, work));

            match run.await {
                Ok(Ok(Ok(()))) => debug!(route = %label, "Background handler finished"),
                Ok(Ok(Err(e))) => error!(route = %label, "Background handler failed: {:#}", e),
                Ok(Err(_)) => error!(
                    route = %label,
                    "Background handler timed out after {:?}", timeout
                ),
                Err(e) if e.is_panic() => error!(route = %label, "Background handler panicked"),
                Err(e) => error!(route = %label, "Background handler aborted: {}", e),
            }
        });

        Ok(())
    }

    pub fn in_flight(&self) -> usize {
        self.limit - self.permits.available_permits()
    }
}

pub struct Dispatcher {
    routes: RouteTable,
    verifier: Verifier,
    timestamp_header: String,
    signature_header: String,
    pool: BackgroundPool,
}

impl Dispatcher {
    pub fn new(
        routes: RouteTable,
        verifier: Verifier,
        timestamp_header: String,
        signature_header: String,
        pool: BackgroundPool,
    ) -> Self {
        Dispatcher {
            routes,
            verifier,
            timestamp_header,
            signature_header,
            pool,
        }
    }

    pub async fn serve(&self, req: Inbound) -> Response {
        let path = req.uri.path().to_owned();

        match self.dispatch(req).await {
            Ok(res) => res,
            Err(e) => {
                match &e {
                    GatewayError::UnsupportedEvent(_) => info!(path = %path, "{}", e),
                    _ => warn!(path = %path, status = %e.status(), "Refused request: {}", e),
                }
                e.into_response()
            }
        }
    }

    async fn dispatch(&self, req: Inbound) -> Result<Response, GatewayError> {
        let route = self
            .routes
            .lookup(&req.method, req.uri.path())
            .ok_or(GatewayError::NotFound)?;

        if route.requires_auth() {
            let signed = SignedRequest::from_headers(
                &req.headers,
                &self.timestamp_header,
                &self.signature_header,
                &req.body,
            )?;
            self.verifier.verify_request(&signed)?;
        }

        if let Endpoint::Http(handler) = route.endpoint() {
            return Ok(handler
                .handle(HttpRequest {
                    method: req.method,
                    uri: req.uri,
                    headers: req.headers,
                    body: req.body,
                })
                .await);
        }

        let envelope = payload::classify(content_type(&req.headers)?, &req.body)?;

        if let Some(challenge) = envelope.challenge() {
            let challenge = challenge?;
            info!(path = route.path(), "Answering URL verification");
            return Ok((StatusCode::OK, challenge.to_owned()).into_response());
        }

        let ctx = Context::new(route.path(), &req.headers);

        match route.endpoint() {
            Endpoint::SlashCommand(handler) => self.slash_command(handler, ctx, envelope).await,
            Endpoint::EventSubscriptions(handler) => self.event(route, handler, ctx, envelope),
            Endpoint::Interactivity(handler) => self.interaction(route, handler, ctx, envelope),
            Endpoint::Http(_) => Err(GatewayError::NotFound),
        }
    }

    async fn slash_command(
        &self,
        handler: &Arc<dyn SlashCommandHandler>,
        ctx: Context,
        envelope: Envelope,
    ) -> Result<Response, GatewayError> {
        let Envelope::Command(form) = envelope else {
            return Err(MalformedRequest::UnexpectedEncoding {
                expected: "url-encoded slash command",
            }
            .into());
        };

        let cmd = SlashCommand::decode(&form)?;
        info!(
            path = %ctx.path,
            command = %cmd.command,
            user = %cmd.user_id,
            "Slash command received"
        );

        let msg = match handler.handle_command(&ctx, cmd).await {
            Ok(msg) => msg,
            Err(e) => {
                error!(path = %ctx.path, "Slash command handler failed: {:#}", e);
                Message::ephemeral(format!("I can't handle your command: {:#}", e))
            }
        };

        Ok((StatusCode::OK, Json(msg)).into_response())
    }

    fn event(
        &self,
        route: &Route,
        handler: &Arc<dyn EventHandler>,
        ctx: Context,
        envelope: Envelope,
    ) -> Result<Response, GatewayError> {
        let Envelope::Json(envelope) = envelope else {
            return Err(MalformedRequest::UnexpectedEncoding {
                expected: "JSON event",
            }
            .into());
        };

        if envelope.kind != EVENT_CALLBACK {
            return Err(GatewayError::UnsupportedEvent(envelope.kind));
        }

        let callback = EventCallback::decode(&envelope)?;
        info!(
            path = %ctx.path,
            event_id = %callback.event_id,
            kind = callback.event.kind().unwrap_or_default(),
            retry = ?ctx.retry_num,
            "Event received"
        );

        let handler = Arc::clone(handler);
        self.pool.submit(route.path().to_owned(), async move {
            handler.handle_event(&ctx, callback).await
        })?;

        Ok(StatusCode::OK.into_response())
    }

    fn interaction(
        &self,
        route: &Route,
        handler: &Arc<dyn InteractivityHandler>,
        ctx: Context,
        envelope: Envelope,
    ) -> Result<Response, GatewayError> {
        let envelope = match envelope {
            Envelope::Interactivity(envelope) => envelope,
            Envelope::Command(_) => return Err(MalformedRequest::MissingPayload.into()),
            Envelope::Json(_) => {
                return Err(MalformedRequest::UnexpectedEncoding {
                    expected: "form with an interactivity payload",
                }
                .into())
            }
        };

        let interaction = Interaction::decode(&envelope)?;
        info!(path = %ctx.path, kind = interaction.kind(), "Interaction received");

        let handler = Arc::clone(handler);
        self.pool.submit(route.path().to_owned(), async move {
            interaction.dispatch(handler.as_ref(), &ctx).await
        })?;

        Ok(StatusCode::OK.into_response())
    }
}

/// The raw `Content-Type`, if sent. Judging the value is left to the
/// classifier.
fn content_type(headers: &HeaderMap) -> Result<Option<&str>, MalformedRequest> {
    headers
        .get(header::CONTENT_TYPE)
        .map(|v| {
            v.to_str()
                .map_err(|_| MalformedRequest::InvalidHeader(header::CONTENT_TYPE.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, Notify};

    fn pool(limit: usize) -> BackgroundPool {
        BackgroundPool::new(limit, Duration::from_millis(200))
    }

    async fn drained(pool: &BackgroundPool) {
        for _ in 0..100 {
            if pool.in_flight() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("pool never drained");
    }

    #[test]
    fn test_content_type() {
        let mut headers = HeaderMap::new();
        assert!(matches!(content_type(&headers), Ok(None)));

        headers.insert(header::CONTENT_TYPE, "garbage".parse().unwrap());
        assert!(matches!(content_type(&headers), Ok(Some("garbage"))));

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_bytes(b"text/\xff").unwrap(),
        );
        assert!(matches!(
            content_type(&headers),
            Err(MalformedRequest::InvalidHeader(h)) if h == "content-type"
        ));
    }

    #[tokio::test]
    async fn test_submit_runs_work() {
        let pool = pool(4);
        let (tx, mut rx) = mpsc::unbounded_channel();

        pool.submit("/test".into(), async move {
            tx.send(7).unwrap();
            Ok(())
        })
        .unwrap();

        assert_eq!(rx.recv().await, Some(7));
        drained(&pool).await;
    }

    #[tokio::test]
    async fn test_saturation() {
        let pool = pool(1);
        let release = Arc::new(Notify::new());

        let wait = release.clone();
        pool.submit("/test".into(), async move {
            wait.notified().await;
            Ok(())
        })
        .unwrap();

        assert_eq!(pool.in_flight(), 1);
        assert!(matches!(
            pool.submit("/test".into(), async { Ok(()) }),
            Err(GatewayError::Saturated)
        ));

        release.notify_one();
        drained(&pool).await;
        pool.submit("/test".into(), async { Ok(()) }).unwrap();
    }

    #[tokio::test]
    async fn test_failures_release_permits() {
        let pool = pool(1);
        let runs = Arc::new(AtomicUsize::new(0));

        async fn fail(runs: Arc<AtomicUsize>) -> anyhow::Result<()> {
            runs.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("nope")
        }

        async fn blow_up(runs: Arc<AtomicUsize>) -> anyhow::Result<()> {
            runs.fetch_add(1, Ordering::SeqCst);
            panic!("handler blew up")
        }

        pool.submit("/err".into(), fail(runs.clone())).unwrap();
        drained(&pool).await;

        pool.submit("/panic".into(), blow_up(runs.clone())).unwrap();
        drained(&pool).await;

        // Outlives the 200ms timeout.
        pool.submit("/slow".into(), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .unwrap();
        drained(&pool).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(pool.in_flight(), 0);
    }
}
