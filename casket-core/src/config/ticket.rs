//! Transient session ticket configuration

use super::{parse_bool, EnvLookup};
use crate::ticket::{
    ExpirationPolicy, RegistryCleanerConfig, TransientSessionTicketFactory, DEFAULT_TIME_TO_KILL_SECS,
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketSettings {
    /// Lifetime of a session ticket in seconds
    /// Env: CASKET_TICKET_TIME_TO_KILL
    /// Default: 300 (5 minutes)
    pub time_to_kill: u64,

    /// Run the background registry cleaner
    /// Env: CASKET_TICKET_CLEANER_ENABLED
    /// Default: true
    pub cleaner_enabled: bool,

    /// Seconds between cleaner runs
    /// Env: CASKET_TICKET_CLEANER_INTERVAL
    /// Default: 120
    pub cleaner_interval: u64,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self { time_to_kill: DEFAULT_TIME_TO_KILL_SECS, cleaner_enabled: true, cleaner_interval: 120 }
    }
}

impl TicketSettings {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self, env: EnvLookup<'_>) {
        if let Some(ttl) = env("CASKET_TICKET_TIME_TO_KILL") {
            if let Ok(t) = ttl.parse() {
                self.time_to_kill = t;
            }
        }

        if let Some(enabled) = env("CASKET_TICKET_CLEANER_ENABLED") {
            self.cleaner_enabled = parse_bool(&enabled).unwrap_or(true);
        }

        if let Some(interval) = env("CASKET_TICKET_CLEANER_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.cleaner_interval = i;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_to_kill == 0 {
            bail!("Invalid ticket time_to_kill: must be greater than 0");
        }

        if self.cleaner_interval == 0 {
            bail!("Invalid ticket cleaner_interval: must be greater than 0");
        }

        Ok(())
    }

    pub fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::HardTimeout { time_to_kill_secs: self.time_to_kill }
    }

    pub fn ticket_factory(&self) -> TransientSessionTicketFactory {
        TransientSessionTicketFactory::new(self.expiration_policy())
    }

    pub fn cleaner_config(&self) -> RegistryCleanerConfig {
        RegistryCleanerConfig::new()
            .with_enabled(self.cleaner_enabled)
            .with_interval(Duration::from_secs(self.cleaner_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_settings() {
        let settings = TicketSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(
            *settings.ticket_factory().expiration_policy(),
            ExpirationPolicy::HardTimeout { time_to_kill_secs: 300 }
        );

        let cleaner = settings.cleaner_config();
        assert!(cleaner.enabled);
        assert_eq!(cleaner.interval, Duration::from_secs(120));

        assert!(TicketSettings { time_to_kill: 0, ..Default::default() }.validate().is_err());
        assert!(TicketSettings { cleaner_interval: 0, ..Default::default() }.validate().is_err());
    }
}
