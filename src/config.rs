//! Client configuration.
//!
//! Settings are layered file → environment → CLI:
//!
//! ```toml
//! # ~/.folio/folio.toml
//! api_url = "https://blog.example.com/api"
//! debounce_ms = 500
//! login_redirect_delay_ms = 2000
//! request_timeout_secs = 30
//! ```
//!
//! Environment overrides: `FOLIO_API_URL`, `FOLIO_STATE_DIR`, `FOLIO_DEBOUNCE_MS`.
//! A `.env` file in the working directory is honoured.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_LOGIN_REDIRECT_DELAY_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE_NAME: &str = "folio.toml";
const STATE_DIR_NAME: &str = ".folio";

/// Contents of `folio.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    #[serde(default)]
    pub login_redirect_delay_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub state_dir: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root without a trailing slash.
    pub api_url: String,
    /// Directory holding `folio.toml` and the persisted session.
    pub state_dir: PathBuf,
    pub debounce: Duration,
    pub login_redirect_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: default_state_dir(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            login_redirect_delay: Duration::from_millis(DEFAULT_LOGIN_REDIRECT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from the process environment.
    pub fn load(cli: CliOverrides) -> Result<Self> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve(cli: CliOverrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = cli
            .state_dir
            .clone()
            .or_else(|| env("FOLIO_STATE_DIR").map(PathBuf::from))
        {
            config.state_dir = dir;
        }

        let file = FileConfig::load(&config.config_file())?;
        if let Some(url) = file.api_url {
            config.api_url = url;
        }
        if let Some(ms) = file.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = file.login_redirect_delay_ms {
            config.login_redirect_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(url) = env("FOLIO_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(raw) = env("FOLIO_DEBOUNCE_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid FOLIO_DEBOUNCE_MS value '{}'", raw))?;
            config.debounce = Duration::from_millis(ms);
        }

        if let Some(url) = cli.api_url {
            config.api_url = url;
        }

        config.api_url = normalize_api_url(&config.api_url)?;
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE_NAME)
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        anyhow::bail!(
            "Invalid API URL '{}': expected an http:// or https:// address",
            raw
        );
    }
    Ok(trimmed.to_string())
}
