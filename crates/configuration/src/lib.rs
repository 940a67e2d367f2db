use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DashboardSettings, DatasetSettings, LogFormat, LoggingSettings, ServerSettings,
};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the application configuration.
///
/// With `Some(path)` the file must exist. With `None`, `config.toml` in the
/// working directory is read if present and the defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (name, required) = match path {
        Some(p) => (p.to_string_lossy().into_owned(), true),
        None => (DEFAULT_CONFIG_FILE.to_string(), false),
    };

    let builder = config::Config::builder()
        .add_source(config::File::new(&name, config::FileFormat::Toml).required(required))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(source = %name, dataset = %config.dataset.path.display(), "Configuration loaded.");
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.dataset.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "dataset.path must not be empty".to_string(),
        ));
    }
    if config.dashboard.yoy_lag == 0 {
        return Err(ConfigError::ValidationError(
            "dashboard.yoy_lag must be at least 1".to_string(),
        ));
    }
    if config.dashboard.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "dashboard.top_n must be at least 1".to_string(),
        ));
    }
    config.server.socket_addr()?;
    Ok(())
}

impl settings::ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            ConfigError::ValidationError(format!(
                "server address '{}:{}' is invalid: {e}",
                self.host, self.port
            ))
        })
    }
}
