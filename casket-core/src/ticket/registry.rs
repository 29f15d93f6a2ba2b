//! Ticket registry trait

use super::TicketRecord;
use crate::error::RegistryResult;
use std::sync::Arc;

/// Durable, possibly distributed mapping from ticket id to ticket record.
///
/// Every call may cross the network. Implementations own expiration: they may
/// evict expired records on their own schedule or keep returning them, and
/// callers must check expiry on read either way.
///
/// Writes are last-writer-wins; there is no compare-and-swap.
#[async_trait::async_trait]
pub trait TicketRegistry: Send + Sync {
    /// Store a new ticket (replaces any record with the same id)
    async fn add_ticket(&self, ticket: TicketRecord) -> RegistryResult<()>;

    /// Persist changes to a ticket
    async fn update_ticket(&self, ticket: TicketRecord) -> RegistryResult<()>;

    /// Fetch a ticket record by id
    async fn get_ticket(&self, id: &str) -> RegistryResult<Option<TicketRecord>>;

    /// Delete a ticket; returns the number of records removed
    async fn delete_ticket(&self, id: &str) -> RegistryResult<usize>;

    /// Number of records currently held
    async fn count(&self) -> RegistryResult<usize>;

    /// Remove expired records; returns the number removed.
    /// Backends with native TTL eviction can keep the default.
    async fn delete_expired(&self) -> RegistryResult<usize> {
        Ok(0)
    }
}

// Implement TicketRegistry for Arc<R> to allow sharing one registry
#[async_trait::async_trait]
impl<R: TicketRegistry + ?Sized> TicketRegistry for Arc<R> {
    async fn add_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        (**self).add_ticket(ticket).await
    }

    async fn update_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        (**self).update_ticket(ticket).await
    }

    async fn get_ticket(&self, id: &str) -> RegistryResult<Option<TicketRecord>> {
        (**self).get_ticket(id).await
    }

    async fn delete_ticket(&self, id: &str) -> RegistryResult<usize> {
        (**self).delete_ticket(id).await
    }

    async fn count(&self) -> RegistryResult<usize> {
        (**self).count().await
    }

    async fn delete_expired(&self) -> RegistryResult<usize> {
        (**self).delete_expired().await
    }
}
