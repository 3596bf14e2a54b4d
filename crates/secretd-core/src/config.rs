//! Gateway configuration.
//!
//! Configuration is driven by environment variables. The server binary layers
//! command-line flags on top of [`GatewayConfig::from_env`].

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use secretd_model::MAX_SECRET_SIZE;

use crate::error::{CoreError, CoreResult};

/// Which secret store client the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The remote secret store over HTTP.
    #[default]
    Remote,
    /// A process-local store, for development and tests.
    Memory,
}

impl StoreBackend {
    /// The backend name as accepted on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "memory" => Ok(Self::Memory),
            other => Err(CoreError::Config(format!(
                "unknown store backend {other:?} (expected \"remote\" or \"memory\")"
            ))),
        }
    }
}

/// secretd gateway configuration.
///
/// # Examples
///
/// ```
/// use secretd_core::config::{GatewayConfig, StoreBackend};
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:8080");
/// assert_eq!(config.backend, StoreBackend::Remote);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway.
    #[builder(default = String::from("0.0.0.0:8080"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Store client implementation.
    #[builder(default)]
    pub backend: StoreBackend,

    /// Base URL of the remote secret store.
    #[builder(default = String::from("https://api.secrethub.io"))]
    pub store_endpoint: String,

    /// Request timeout of the remote store client, in seconds.
    #[builder(default = 30)]
    pub store_timeout_secs: u64,

    /// Largest secret the store client accepts, in bytes.
    #[builder(default = MAX_SECRET_SIZE)]
    pub max_secret_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:8080` |
    /// | `SECRETD_PORT` | *(unset)*, replaces the port of `GATEWAY_LISTEN` |
    /// | `LOG_LEVEL` | `info` |
    /// | `SECRETD_BACKEND` | `remote` |
    /// | `SECRETD_STORE_ENDPOINT` | `https://api.secrethub.io` |
    /// | `SECRETD_STORE_TIMEOUT_SECS` | `30` |
    /// | `SECRETD_MAX_SECRET_SIZE` | `524288` |
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("SECRETD_PORT") {
            config.set_port(parse_number("SECRETD_PORT", &v)?);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("SECRETD_BACKEND") {
            config.backend = v.parse()?;
        }
        if let Some(v) = lookup("SECRETD_STORE_ENDPOINT") {
            config.store_endpoint = v;
        }
        if let Some(v) = lookup("SECRETD_STORE_TIMEOUT_SECS") {
            config.store_timeout_secs = parse_number("SECRETD_STORE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SECRETD_MAX_SECRET_SIZE") {
            config.max_secret_size = parse_number("SECRETD_MAX_SECRET_SIZE", &v)?;
        }

        Ok(config)
    }

    /// Replace the port of [`gateway_listen`](Self::gateway_listen), keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.gateway_listen.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.gateway_listen.as_str(),
        };
        self.gateway_listen = format!("{host}:{port}");
    }

    /// Parse the bind address.
    pub fn listen_addr(&self) -> CoreResult<SocketAddr> {
        self.gateway_listen.parse().map_err(|_| {
            CoreError::Config(format!("invalid bind address: {}", self.gateway_listen))
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> CoreResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{key} must be a number, got {value:?}")))
}
