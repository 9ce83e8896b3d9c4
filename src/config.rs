//! Configuration loading and resolution.
//!
//! Every setting resolves as: command-line flag, then environment variable,
//! then built-in default.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const ADDR_ENV: &str = "COMMERCE_MCP_ADDR";
pub const TRANSPORT_ENV: &str = "COMMERCE_MCP_TRANSPORT";
pub const SESSION_TTL_ENV: &str = "COMMERCE_MCP_SESSION_TTL";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Idle time after which an HTTP session and its cart are dropped
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid listen address {value:?}: {reason}")]
    InvalidAddr { value: String, reason: String },

    #[error("Unknown transport {0:?} (expected \"http\" or \"stdio\")")]
    InvalidTransport(String),

    #[error("Invalid session TTL {0:?} (expected a positive number of seconds)")]
    InvalidSessionTtl(String),
}

/// How the server talks to clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Http,
    Stdio,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Transport::Http),
            "stdio" => Ok(Transport::Stdio),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub transport: Transport,
    pub log_level: String,
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Resolves against the process environment.
    pub fn resolve(
        addr: Option<&str>,
        transport: Option<Transport>,
        log_level: Option<&str>,
        session_ttl_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(addr, transport, log_level, session_ttl_secs, |key| {
            std::env::var(key).ok()
        })
    }

    /// Resolves against an arbitrary variable lookup.
    pub fn resolve_with(
        addr: Option<&str>,
        transport: Option<Transport>,
        log_level: Option<&str>,
        session_ttl_secs: Option<u64>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let addr_value = addr
            .map(str::to_string)
            .or_else(|| env(ADDR_ENV))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                reason: e.to_string(),
            })?;

        let transport = match transport {
            Some(t) => t,
            None => env(TRANSPORT_ENV)
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let ttl_secs = match session_ttl_secs {
            Some(secs) => secs,
            None => match env(SESSION_TTL_ENV) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSessionTtl(v.clone()))?,
                None => DEFAULT_SESSION_TTL_SECS,
            },
        };
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidSessionTtl(ttl_secs.to_string()));
        }

        Ok(Self {
            addr,
            transport,
            log_level: log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_string(),
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }
}
