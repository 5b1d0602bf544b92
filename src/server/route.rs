use super::{
    command::SlashCommandHandler, error::ConfigError, event::EventHandler, http::HttpHandler,
    interaction::InteractivityHandler,
};
use axum::http::Method;
use std::{collections::HashMap, fmt, sync::Arc};

/// What a route hands its requests to. The first three are the platform's own
/// request types; `Http` is for anything else sharing the listener.
#[derive(Clone)]
pub enum Endpoint {
    SlashCommand(Arc<dyn SlashCommandHandler>),
    EventSubscriptions(Arc<dyn EventHandler>),
    Interactivity(Arc<dyn InteractivityHandler>),
    Http(Arc<dyn HttpHandler>),
}

impl Endpoint {
    fn name(&self) -> &'static str {
        match self {
            Endpoint::SlashCommand(_) => "slash command",
            Endpoint::EventSubscriptions(_) => "event subscriptions",
            Endpoint::Interactivity(_) => "interactivity",
            Endpoint::Http(_) => "http",
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({})", self.name())
    }
}

#[derive(Clone, Debug)]
pub struct Route {
    method: Method,
    path: String,
    endpoint: Endpoint,
    requires_auth: bool,
}

impl Route {
    fn new<P: ToString>(method: Method, path: P, endpoint: Endpoint, requires_auth: bool) -> Self {
        Route {
            method,
            path: path.to_string(),
            endpoint,
            requires_auth,
        }
    }

    pub fn slash_command<P, H>(path: P, handler: H) -> Self
    where
        P: ToString,
        H: SlashCommandHandler + 'static,
    {
        Self::new(
            Method::POST,
            path,
            Endpoint::SlashCommand(Arc::new(handler)),
            true,
        )
    }

    pub fn event_subscriptions<P, H>(path: P, handler: H) -> Self
    where
        P: ToString,
        H: EventHandler + 'static,
    {
        Self::new(
            Method::POST,
            path,
            Endpoint::EventSubscriptions(Arc::new(handler)),
            true,
        )
    }

    pub fn interactivity<P, H>(path: P, handler: H) -> Self
    where
        P: ToString,
        H: InteractivityHandler + 'static,
    {
        Self::new(
            Method::POST,
            path,
            Endpoint::Interactivity(Arc::new(handler)),
            true,
        )
    }

    /// A plain HTTP route. Unlike the platform routes these aren't verified
    /// unless [Route::authenticated] is called.
    pub fn http<P, H>(method: Method, path: P, handler: H) -> Self
    where
        P: ToString,
        H: HttpHandler + 'static,
    {
        Self::new(method, path, Endpoint::Http(Arc::new(handler)), false)
    }

    /// Require a valid signature before the handler sees anything.
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

/// Exact `(method, path)` lookup. Query strings and trailing slashes are not
/// normalized.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<(Method, String), Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, route: Route) -> Result<(), ConfigError> {
        if !route.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(route.path));
        }

        let key = (route.method.clone(), route.path.clone());
        if self.routes.contains_key(&key) {
            return Err(ConfigError::DuplicateRoute {
                method: key.0,
                path: key.1,
            });
        }

        self.routes.insert(key, route);
        Ok(())
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.get(&(method.clone(), path.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        block::Message,
        server::{command::SlashCommand, context::Context, http::HttpRequest},
    };
    use async_trait::async_trait;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
    };

    struct Echo;

    #[async_trait]
    impl SlashCommandHandler for Echo {
        async fn handle_command(&self, _: &Context, cmd: SlashCommand) -> anyhow::Result<Message> {
            Ok(Message::text(cmd.text))
        }
    }

    async fn ok(_: HttpRequest) -> Response {
        StatusCode::OK.into_response()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut table = RouteTable::new();
        table.register(Route::slash_command("/echo", Echo)).unwrap();
        table.register(Route::http(Method::GET, "/health", ok)).unwrap();

        let route = table.lookup(&Method::POST, "/echo").unwrap();
        assert!(route.requires_auth());
        assert!(matches!(route.endpoint(), Endpoint::SlashCommand(_)));

        let route = table.lookup(&Method::GET, "/health").unwrap();
        assert!(!route.requires_auth());

        assert!(table.lookup(&Method::GET, "/echo").is_none());
        assert!(table.lookup(&Method::POST, "/echo/").is_none());
        assert!(table.lookup(&Method::POST, "/health").is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut table = RouteTable::new();
        table.register(Route::slash_command("/echo", Echo)).unwrap();

        assert_eq!(
            table.register(Route::http(Method::POST, "/echo", ok)),
            Err(ConfigError::DuplicateRoute {
                method: Method::POST,
                path: "/echo".into()
            })
        );

        // Same path under another method is a different route.
        table
            .register(Route::slash_command("/echo", Echo).method(Method::PUT))
            .unwrap();
    }

    #[test]
    fn test_relative_path_rejected() {
        assert_eq!(
            RouteTable::new().register(Route::slash_command("echo", Echo)),
            Err(ConfigError::InvalidPath("echo".into()))
        );
    }

    #[test]
    fn test_authenticated_http() {
        assert!(Route::http(Method::POST, "/hook", ok)
            .authenticated()
            .requires_auth());
    }
}
