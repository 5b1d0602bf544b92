//! The escape hatch for plain HTTP endpoints (health checks, alternate
//! integrations) served from the same listener. Nothing platform-specific is
//! decoded for these.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    response::Response,
};
use std::future::Future;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait]
pub trait HttpHandler: Send + Sync {
    async fn handle(&self, req: HttpRequest) -> Response;
}

/// Any async function from [HttpRequest] to [Response] is a handler.
#[async_trait]
impl<F, Fut> HttpHandler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn handle(&self, req: HttpRequest) -> Response {
        (self)(req).await
    }
}
