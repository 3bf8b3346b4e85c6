//! Blog configuration - environment loading
//!
//! Configuration is loaded from environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `RUSHMORE_ANON_KEY`: key granting anonymous (read/write) access
//! - `RUSHMORE_SERVICE_ROLE_KEY`: key granting service-role access
//! - `RUSHMORE_BIND`: address to bind to (default: 127.0.0.1:3030)
//! - `RUSHMORE_MAX_CONNECTIONS`: pool size (default: 5)

use std::net::SocketAddr;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Default maximum pool connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// API keys controlling caller privilege.
///
/// An unset key disables the corresponding check, see
/// [`crate::http::extractors::Access`].
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
}

impl ApiKeys {
    pub fn new(anon_key: Option<String>, service_role_key: Option<String>) -> Self {
        Self {
            anon_key: anon_key.filter(|k| !k.is_empty()),
            service_role_key: service_role_key.filter(|k| !k.is_empty()),
        }
    }
}

/// Blog configuration
///
/// `database_url` is optional here so in-memory serving works without it;
/// [`BlogConfig::database_url`] reports it as missing on demand.
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub keys: ApiKeys,
}

impl BlogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from any variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = get("RUSHMORE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = parse_bind(&bind)?;

        let max_connections = match get("RUSHMORE_MAX_CONNECTIONS") {
            Some(raw) => parse_max_connections(&raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_addr,
            max_connections,
            keys: ApiKeys::new(get("RUSHMORE_ANON_KEY"), get("RUSHMORE_SERVICE_ROLE_KEY")),
        })
    }

    /// The database URL, or `Missing` when none was configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing { var: "DATABASE_URL" })
    }
}

fn parse_bind(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: "RUSHMORE_BIND",
        value: raw.to_owned(),
    })
}

fn parse_max_connections(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var: "RUSHMORE_MAX_CONNECTIONS",
            value: raw.to_owned(),
        }),
    }
}
