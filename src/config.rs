use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::districts;
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Settings read from `config.json`. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default = "districts::default_districts")]
    pub districts: Vec<String>,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Where contracts are written. Defaults to `~/Documents/Band Contracts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts_dir: Option<PathBuf>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub band: BandProfile,
}

/// Letterhead printed at the top of every contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandProfile {
    #[serde(default = "BandProfile::default_name")]
    pub name: String,
    #[serde(default = "BandProfile::default_tagline")]
    pub tagline: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact: String,
}

impl Default for BandProfile {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            tagline: Self::default_tagline(),
            address: String::new(),
            contact: String::new(),
        }
    }
}

impl BandProfile {
    pub fn default_name() -> String {
        "Tanmay Kar and Friends".into()
    }

    pub fn default_tagline() -> String {
        "(A Folk-Based Urban Band)".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "Theme::default_accent")]
    pub accent: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Self::default_accent(),
        }
    }
}

impl Theme {
    pub fn default_accent() -> String {
        "#1f3a5f".into()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            districts: districts::default_districts(),
            retry: RetryPolicy::default(),
            contracts_dir: None,
            theme: Theme::default(),
            band: BandProfile::default(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Config = if path.exists() {
            let data = fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.band.name.trim().is_empty() {
            return Err(ConfigError::Invalid("band.name cannot be empty".into()));
        }
        if self.districts.is_empty() {
            return Err(ConfigError::Invalid("districts cannot be empty".into()));
        }
        crate::format::parse_hex_rgb(&self.theme.accent)
            .map_err(|err| ConfigError::Invalid(format!("theme.accent: {err}")))?;
        Ok(())
    }

    /// `DATABASE_URL` wins over the config file.
    pub fn resolve_database_url(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.database_url.clone())
    }

    pub fn resolve_contracts_dir(&self) -> PathBuf {
        self.contracts_dir.clone().unwrap_or_else(|| {
            dirs::document_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Band Contracts")
        })
    }
}
