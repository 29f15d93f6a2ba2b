//! Logging configuration

use super::EnvLookup;
use crate::logging::{LogFormat, LogLevel, LogOutput, LoggingConfig};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// error, warn, info, debug or trace
    /// Env: CASKET_LOG_LEVEL
    /// Default: "info"
    pub level: String,

    /// json, human, logfmt or custom:<template>
    /// Env: CASKET_LOG_FORMAT
    /// Default: "human"
    pub format: String,

    /// stdout or stderr
    /// Env: CASKET_LOG_OUTPUT
    /// Default: "stdout"
    pub output: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "human".to_string(), output: "stdout".to_string() }
    }
}

impl LoggingSettings {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self, env: EnvLookup<'_>) {
        if let Some(level) = env("CASKET_LOG_LEVEL") {
            self.level = level;
        }

        if let Some(format) = env("CASKET_LOG_FORMAT") {
            self.format = format;
        }

        if let Some(output) = env("CASKET_LOG_OUTPUT") {
            self.output = output;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.logging_config().map(|_| ())
    }

    /// Logger configuration for [`crate::logging::init_logging`]
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        let level: LogLevel = self.level.parse().map_err(|e| anyhow!("Invalid log level: {}", e))?;
        let format: LogFormat = self.format.parse().map_err(|e| anyhow!("Invalid log format: {}", e))?;
        let output: LogOutput = self.output.parse().map_err(|e| anyhow!("Invalid log output: {}", e))?;

        Ok(LoggingConfig::default().with_level(level).with_format(format).with_output(output))
    }
}
