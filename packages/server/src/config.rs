//! Server configuration, populated from environment variables.

use std::net::SocketAddr;

/// Default documentation path template; `{apiName}` is replaced per API.
pub const DEFAULT_DOCS_PATH: &str = "/api/{apiName}/docs";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("REMOTING_BIND must be a valid socket address (e.g. 0.0.0.0:3000), got {0:?}")]
    InvalidBind(String),

    #[error("REMOTING_DOCS_PATH must start with '/', got {0:?}")]
    InvalidDocsPath(String),
}

/// Runtime configuration for a remoting server.
///
/// All fields are populated from environment variables with sensible
/// defaults, so a server can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `REMOTING_BIND` | `0.0.0.0:3000` | TCP socket address to listen on |
/// | `REMOTING_DOCS_PATH` | `/api/{apiName}/docs` | Documentation endpoint template |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Path template of the documentation endpoint. `{apiName}` expands to
    /// each mounted API's name.
    pub docs_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            docs_path: DEFAULT_DOCS_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("REMOTING_BIND") {
            config.bind_addr = raw.parse().map_err(|_| ConfigError::InvalidBind(raw))?;
        }

        if let Some(path) = lookup("REMOTING_DOCS_PATH") {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidDocsPath(path));
            }
            config.docs_path = path;
        }

        Ok(config)
    }
}
