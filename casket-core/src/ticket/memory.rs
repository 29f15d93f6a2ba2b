//! In-memory ticket registry
//!
//! Backed by a lock-free `scc::HashMap`. Suitable for tests and single-node
//! deployments; tickets are lost on restart and are not shared between nodes.

use super::{TicketRecord, TicketRegistry};
use crate::error::RegistryResult;
use chrono::Utc;
use scc::hash_map::Entry;
use scc::HashMap as SccHashMap;
use std::sync::Arc;

/// In-memory ticket registry
///
/// Expired records stay readable until [`TicketRegistry::delete_expired`]
/// runs; readers decide what an expired record means.
///
/// # Example
///
/// ```
/// use casket_core::ticket::MemoryTicketRegistry;
///
/// let registry = MemoryTicketRegistry::new();
/// ```
#[derive(Clone, Default)]
pub struct MemoryTicketRegistry {
    tickets: Arc<SccHashMap<String, TicketRecord>>,
}

impl MemoryTicketRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    async fn put(&self, ticket: TicketRecord) {
        match self.tickets.entry_async(ticket.id.clone()).await {
            Entry::Occupied(mut o) => {
                *o.get_mut() = ticket;
            }
            Entry::Vacant(v) => {
                v.insert_entry(ticket);
            }
        }
    }
}

#[async_trait::async_trait]
impl TicketRegistry for MemoryTicketRegistry {
    async fn add_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        log::trace!("Adding ticket [{}]", ticket.id);
        self.put(ticket).await;
        Ok(())
    }

    async fn update_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        log::trace!("Updating ticket [{}]", ticket.id);
        self.put(ticket).await;
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> RegistryResult<Option<TicketRecord>> {
        Ok(self.tickets.read_async(id, |_, ticket| ticket.clone()).await)
    }

    async fn delete_ticket(&self, id: &str) -> RegistryResult<usize> {
        let removed = self.tickets.remove_async(id).await.is_some();
        Ok(usize::from(removed))
    }

    async fn count(&self) -> RegistryResult<usize> {
        Ok(self.tickets.len())
    }

    async fn delete_expired(&self) -> RegistryResult<usize> {
        let now = Utc::now();
        let mut removed = 0;
        self.tickets.retain_sync(|_, record| {
            let expired = record.is_expired_at(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        Ok(removed)
    }
}
