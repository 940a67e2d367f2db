use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing `config.toml` yields the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetSettings,
    pub dashboard: DashboardSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

/// Where the sales table lives and how long a loaded copy stays fresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// The CSV export of the marker sales table.
    pub path: PathBuf,
    /// Seconds a loaded dataset is reused before the file is read again.
    pub cache_ttl_secs: u64,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("acrylic_markers.csv"),
            cache_ttl_secs: 3600,
        }
    }
}

/// Parameters of the dashboard panels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Length of the "most stable" and "at risk" ASIN lists.
    pub top_n: usize,
    /// Periods between the two values of a period-over-period change.
    /// 4 on quarterly data gives year-over-year.
    pub yoy_lag: usize,
    /// Substrings that mark an ink colour as a single solid colour set.
    pub independent_color_markers: Vec<String>,
    pub color_match_case_sensitive: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_n: 20,
            yoy_lag: 4,
            independent_color_markers: ["White", "Black", "Gold", "Silver", "Metallic"]
                .into_iter()
                .map(String::from)
                .collect(),
            color_match_case_sensitive: true,
        }
    }
}

/// Bind address of the JSON API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}
