//! Transient session tickets: server-side session attribute storage

use super::{ExpirationPolicy, Ticket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Id prefix of transient session tickets
pub const TRANSIENT_SESSION_TICKET_PREFIX: &str = "TST";

/// Default lifetime of a transient session ticket (5 minutes)
pub const DEFAULT_TIME_TO_KILL_SECS: u64 = 300;

/// Session attributes held by a ticket
pub type TicketProperties = HashMap<String, Value>;

/// Registry key for the transient session ticket of `session_id`
pub fn normalize_ticket_id(session_id: &str) -> String {
    format!("{}-{}", TRANSIENT_SESSION_TICKET_PREFIX, session_id)
}

/// Ticket holding the attributes of one distributed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientSessionTicket {
    id: String,
    properties: TicketProperties,
    creation_time: DateTime<Utc>,
    last_time_used: DateTime<Utc>,
    expiration_policy: ExpirationPolicy,
}

impl TransientSessionTicket {
    pub fn new(id: impl Into<String>, properties: TicketProperties, expiration_policy: ExpirationPolicy) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            properties,
            creation_time: now,
            last_time_used: now,
            expiration_policy,
        }
    }

    pub fn properties(&self) -> &TicketProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut TicketProperties {
        &mut self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Record a use of the ticket (drives idle expiration)
    pub fn update(&mut self) {
        self.last_time_used = Utc::now();
    }
}

impl Ticket for TransientSessionTicket {
    const PREFIX: &'static str = TRANSIENT_SESSION_TICKET_PREFIX;

    fn id(&self) -> &str {
        &self.id
    }

    fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    fn last_time_used(&self) -> DateTime<Utc> {
        self.last_time_used
    }

    fn expiration_policy(&self) -> &ExpirationPolicy {
        &self.expiration_policy
    }
}

/// Creates transient session tickets and maps session ids to ticket ids
pub trait SessionTicketFactory: Send + Sync {
    fn create(&self, session_id: &str, properties: TicketProperties) -> TransientSessionTicket;

    fn normalize_ticket_id(&self, session_id: &str) -> String {
        normalize_ticket_id(session_id)
    }
}

/// Default factory applying one expiration policy to every ticket
#[derive(Debug, Clone)]
pub struct TransientSessionTicketFactory {
    expiration_policy: ExpirationPolicy,
}

impl Default for TransientSessionTicketFactory {
    fn default() -> Self {
        Self::new(ExpirationPolicy::HardTimeout { time_to_kill_secs: DEFAULT_TIME_TO_KILL_SECS })
    }
}

impl TransientSessionTicketFactory {
    pub fn new(expiration_policy: ExpirationPolicy) -> Self {
        Self { expiration_policy }
    }

    pub fn expiration_policy(&self) -> &ExpirationPolicy {
        &self.expiration_policy
    }
}

impl SessionTicketFactory for TransientSessionTicketFactory {
    fn create(&self, session_id: &str, properties: TicketProperties) -> TransientSessionTicket {
        TransientSessionTicket::new(self.normalize_ticket_id(session_id), properties, self.expiration_policy)
    }
}
