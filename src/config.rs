//! Configuration for the bundled bot, read from the environment (and `.env`,
//! if present).

use crate::{api::auth::AccessToken, api::API_BASE, server::SigningSecret};
use std::{env, fmt};
use tracing::Level;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, PartialEq, Eq)]
pub enum EnvError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::Missing(key) => write!(f, "No ${} environment variable found", key),
            EnvError::Invalid { key, value } => write!(f, "Could not parse ${}: {:?}", key, value),
        }
    }
}

impl std::error::Error for EnvError {}

#[derive(Debug)]
pub struct Config {
    pub signing_secret: SigningSecret,
    pub access_token: AccessToken,
    pub port: u16,
    pub log_level: Level,
    pub api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any source of variables. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(EnvError::Missing(key));

        let port = match get("PORT") {
            Some(v) => v.trim().parse().map_err(|_| EnvError::Invalid {
                key: "PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(v) => v.trim().parse().map_err(|_| EnvError::Invalid {
                key: "LOG_LEVEL",
                value: v,
            })?,
            None => Level::INFO,
        };

        Ok(Config {
            signing_secret: SigningSecret(required("SIGNING_SECRET")?),
            access_token: AccessToken(required("ACCESS_TOKEN")?),
            port,
            log_level,
            api_base: get("API_BASE").unwrap_or_else(|| API_BASE.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, EnvError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[("SIGNING_SECRET", "s"), ("ACCESS_TOKEN", "xoxb-1")]).unwrap();

        assert_eq!(c.signing_secret.0, "s");
        assert_eq!(c.access_token.0, "xoxb-1");
        assert_eq!(c.port, 8080);
        assert_eq!(c.log_level, Level::INFO);
        assert_eq!(c.api_base, "https://slack.com/api");
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("SIGNING_SECRET", "s"),
            ("ACCESS_TOKEN", "xoxb-1"),
            ("PORT", "3000"),
            ("LOG_LEVEL", "debug"),
            ("API_BASE", "http://localhost:1234"),
        ])
        .unwrap();

        assert_eq!(c.port, 3000);
        assert_eq!(c.log_level, Level::DEBUG);
        assert_eq!(c.api_base, "http://localhost:1234");
    }

    #[test]
    fn test_missing() {
        assert_eq!(
            config(&[("ACCESS_TOKEN", "xoxb-1")]).unwrap_err(),
            EnvError::Missing("SIGNING_SECRET")
        );
        assert_eq!(
            config(&[("SIGNING_SECRET", "  "), ("ACCESS_TOKEN", "xoxb-1")]).unwrap_err(),
            EnvError::Missing("SIGNING_SECRET")
        );
        assert_eq!(
            config(&[("SIGNING_SECRET", "s")]).unwrap_err(),
            EnvError::Missing("ACCESS_TOKEN")
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            config(&[("SIGNING_SECRET", "s"), ("ACCESS_TOKEN", "t"), ("PORT", "eighty")])
                .unwrap_err(),
            EnvError::Invalid {
                key: "PORT",
                value: "eighty".into()
            }
        );
        assert!(matches!(
            config(&[("SIGNING_SECRET", "s"), ("ACCESS_TOKEN", "t"), ("LOG_LEVEL", "loud")]),
            Err(EnvError::Invalid { key: "LOG_LEVEL", .. })
        ));
    }
}
