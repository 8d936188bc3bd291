//! Settings for the quote endpoint, narration voice, connectivity check,
//! homepage and copy notifications.
//!
//! Read from `config.yaml` in the working directory, the user config
//! directory or `/etc/quotes`, first match wins. Every section has
//! defaults, so an empty file (or none at all) is a valid config.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://api.forismatic.com/api/1.0/?method=getQuote&lang=en&format=json".into(),
            timeout_secs: 10,
        }
    }
}

impl QuotesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub command: String,
    pub voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: "say".into(),
            voice: "Alex".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address dialed to decide whether a failed fetch means "offline".
    pub probe_addr: String,
    pub probe_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_addr: "1.1.1.1:53".into(),
            probe_timeout_ms: 1500,
        }
    }
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HomepageConfig {
    pub url: String,
}

impl Default for HomepageConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/JoaoFCosta".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub notifications: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quotes: QuotesConfig,
    pub speech: SpeechConfig,
    pub network: NetworkConfig,
    pub homepage: HomepageConfig,
    pub feedback: FeedbackConfig,
}

const FILE_NAME: &str = "config.yaml";
const SYSTEM_DIR: &str = "/etc/quotes";

impl Config {
    /// Load `path`, or the first config file found by [`search_paths`].
    /// Unreadable or malformed files are logged and replaced by defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let found = match path {
            Some(p) => Some(p.to_path_buf()),
            None => search_paths().into_iter().find(|p| p.is_file()),
        };

        let Some(file) = found else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match Self::read(&file) {
            Ok(config) => {
                info!("Loaded config from {}", file.display());
                config
            }
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    fn read(file: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
        Self::parse(&contents).map_err(|e| format!("Failed to parse {}: {e}", file.display()))
    }

    fn parse(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }
}

/// Config file locations in lookup order.
pub fn search_paths() -> Vec<PathBuf> {
    let dirs = [
        std::env::current_dir().ok(),
        dirs::config_dir().map(|d| d.join("quotes")),
        Some(PathBuf::from(SYSTEM_DIR)),
    ];
    dirs.into_iter().flatten().map(|d| d.join(FILE_NAME)).collect()
}
