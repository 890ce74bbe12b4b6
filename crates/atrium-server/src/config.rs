//! Server configuration: TOML file layered with `ATRIUM_*` environment
//! variables.

use atrium_auth::AuthConfig;
use serde::Deserialize;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "atrium.toml";

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub server: ListenConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Auth subsystem settings.
    pub auth: AuthConfig,
    /// Optional one-time superuser bootstrap.
    pub bootstrap: Option<BootstrapConfig>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `atrium_auth=debug,info`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Superuser account created at startup when none exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Superuser display name.
    pub full_name: String,
    /// Superuser username.
    pub username: String,
    /// Superuser email.
    pub email: String,
    /// Superuser password.
    pub password: String,
}

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File or environment parsing failed.
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
    /// The loaded values are inconsistent.
    #[error(transparent)]
    Invalid(#[from] atrium_auth::ConfigError),
}

/// Loads configuration from `path` (optional file) and the environment.
///
/// Environment variables use the `ATRIUM_` prefix with `__` as the section
/// separator, e.g. `ATRIUM_AUTH__JWT__SECRET`.
pub fn load_config(path: &str) -> Result<ServerConfig, LoadError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("ATRIUM").separator("__"))
        .build()?;

    let cfg: ServerConfig = settings.try_deserialize()?;
    cfg.auth.validate()?;
    Ok(cfg)
}
