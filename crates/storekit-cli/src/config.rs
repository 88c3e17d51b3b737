use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storekit::{Locale, Source, UnknownSource};
use storekit_stores::HttpConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Preferred sources, merged with the default order.
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub require_download_link: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub http: HttpSection,
}

/// Overrides for the shared HTTP client.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpSection {
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

fn default_language() -> String {
    "en".into()
}

fn default_country() -> String {
    "us".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            priority: Vec::new(),
            require_download_link: false,
            language: default_language(),
            country: default_country(),
            http: HttpSection::default(),
        }
    }
}

impl AppConfig {
    pub fn priority_sources(&self) -> Result<Vec<Source>, UnknownSource> {
        self.priority.iter().map(|name| name.parse()).collect()
    }

    pub fn locale(&self) -> Locale {
        Locale::new(&self.language, &self.country)
    }
}

impl HttpSection {
    pub fn to_http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::default();
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Config file path: `~/.config/storekit/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("storekit").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(
                "failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}
