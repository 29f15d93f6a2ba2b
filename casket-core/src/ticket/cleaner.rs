//! Background removal of expired tickets
//!
//! The cleaner periodically asks a [`TicketRegistry`] to drop expired records.
//! Registries with native TTL eviction do not need one.

use super::TicketRegistry;
use crate::error::RegistryResult;
use std::sync::Arc;
use std::time::Duration;

/// Registry cleaner configuration
#[derive(Debug, Clone)]
pub struct RegistryCleanerConfig {
    /// Run the cleaner at all
    pub enabled: bool,

    /// Interval between cleanup runs
    pub interval: Duration,

    /// Log cleanup operations
    pub log_cleanup: bool,
}

impl Default for RegistryCleanerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(120),
            log_cleanup: true,
        }
    }
}

impl RegistryCleanerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_log_cleanup(mut self, enabled: bool) -> Self {
        self.log_cleanup = enabled;
        self
    }
}

/// Periodic cleaner bound to one registry.
///
/// Must be started inside a tokio runtime. The task stops when the cleaner is
/// dropped.
pub struct RegistryCleaner {
    registry: Arc<dyn TicketRegistry>,
    task: Option<tokio::task::JoinHandle<()>>,
    config: RegistryCleanerConfig,
}

impl RegistryCleaner {
    pub fn start(registry: Arc<dyn TicketRegistry>, config: RegistryCleanerConfig) -> Self {
        let task = if config.enabled {
            let cleanup_registry = Arc::clone(&registry);
            let interval = config.interval;
            let log_cleanup = config.log_cleanup;

            Some(tokio::spawn(async move {
                let mut interval_timer = tokio::time::interval(interval);
                loop {
                    interval_timer.tick().await;

                    match cleanup_registry.delete_expired().await {
                        Ok(count) if count > 0 => {
                            if log_cleanup {
                                log::info!("Removed {} expired tickets", count);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            log::error!("Ticket registry cleanup failed: {}", e);
                        }
                    }
                }
            }))
        } else {
            None
        };

        Self { registry, task, config }
    }

    pub fn config(&self) -> &RegistryCleanerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Run a cleanup immediately, outside the schedule
    pub async fn clean_now(&self) -> RegistryResult<usize> {
        self.registry.delete_expired().await
    }
}

impl Drop for RegistryCleaner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
