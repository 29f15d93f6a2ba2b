//! Configuration system for Casket
//!
//! # Configuration Hierarchy
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on the built components)
//! 2. **Environment Variables** (`CASKET_*`)
//! 3. **Config File** (casket.toml)
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use casket_core::config::CasketConfig;
//!
//! // Load with full supersedence
//! let config = CasketConfig::load()?;
//!
//! // Or load from specific file
//! let config = CasketConfig::from_file("casket.toml")?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! A complete file:
//!
//! ```toml
//! [cookie]
//! name = "DISSESSION"
//! path = "/cas"
//! domain = "sso.example.org"
//! max_age = -1
//! same_site = "Lax"
//! remember_me_max_age = 1209600
//!
//! [cookie.signing]
//! enabled = true
//! key = "<base64, 32 bytes or more>"
//! pin_to_client = true
//!
//! [ticket]
//! time_to_kill = 300
//! cleaner_interval = 120
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

pub mod cookie;
pub mod logging;
pub mod ticket;

pub use cookie::{CookieSettings, SigningSettings};
pub use logging::LoggingSettings;
pub use ticket::TicketSettings;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Source of environment overrides
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Complete Casket configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasketConfig {
    pub cookie: CookieSettings,
    pub ticket: TicketSettings,
    pub logging: LoggingSettings,
}

impl CasketConfig {
    /// Load configuration with full supersedence chain
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (casket.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        Self::load_from("casket.toml")
    }

    /// Load configuration from a specific file, if it exists
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.cookie.merge(other.cookie);
        self.ticket.merge(other.ticket);
        self.logging.merge(other.logging);
    }

    /// Apply `CASKET_*` environment variables
    pub fn apply_env_vars(&mut self) {
        self.apply_env_from(&|key: &str| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup
    pub fn apply_env_from(&mut self, env: EnvLookup<'_>) {
        self.cookie.apply_env_vars(env);
        self.ticket.apply_env_vars(env);
        self.logging.apply_env_vars(env);
    }

    pub fn validate(&self) -> Result<()> {
        self.cookie.validate()?;
        self.ticket.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Lenient boolean parsing for environment values
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
