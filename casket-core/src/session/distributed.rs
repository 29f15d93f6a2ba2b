//! Session store backed by the ticket registry

use super::{SessionStore, TrackableSession};
use crate::config::CasketConfig;
use crate::cookie::CookieManager;
use crate::error::SessionError;
use crate::ticket::{
    SessionTicketFactory, Ticket, TicketProperties, TicketRecord, TicketRegistry, TransientSessionTicket,
};
use crate::web::WebContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Request attribute caching the resolved session id
pub const SESSION_ID_IN_REQUEST_ATTRIBUTE: &str = "sessionIdInRequestAttribute";

/// Change requested by a `set` call
enum AttributeUpdate {
    Remove,
    Store(Value),
    /// The caller's value could not be serialized
    Unserializable,
}

/// Session store keeping attributes in transient session tickets.
///
/// The store itself holds no per-request state; share one instance (or
/// clones of it) across all requests.
#[derive(Clone)]
pub struct DistributedSessionStore {
    registry: Arc<dyn TicketRegistry>,
    ticket_factory: Arc<dyn SessionTicketFactory>,
    cookie_manager: CookieManager,
}

impl std::fmt::Debug for DistributedSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedSessionStore")
            .field("cookie_manager", &self.cookie_manager)
            .finish_non_exhaustive()
    }
}

impl DistributedSessionStore {
    pub fn new(
        registry: Arc<dyn TicketRegistry>,
        ticket_factory: Arc<dyn SessionTicketFactory>,
        cookie_manager: CookieManager,
    ) -> Self {
        Self { registry, ticket_factory, cookie_manager }
    }

    /// Build a store from configuration over the given registry
    pub fn from_config(registry: Arc<dyn TicketRegistry>, config: &CasketConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let cookie_manager = config.cookie.cookie_manager()?;
        let ticket_factory = Arc::new(config.ticket.ticket_factory());
        Ok(Self::new(registry, ticket_factory, cookie_manager))
    }

    pub fn cookie_manager(&self) -> &CookieManager {
        &self.cookie_manager
    }

    pub fn registry(&self) -> &Arc<dyn TicketRegistry> {
        &self.registry
    }

    /// Store a typed attribute.
    ///
    /// A value that cannot be represented as JSON is dropped with a
    /// diagnostic; the call still succeeds.
    pub async fn set_attribute<T>(&self, ctx: &mut WebContext, key: &str, value: &T) -> Result<(), SessionError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let update = match serde_json::to_value(value) {
            Ok(Value::Null) => AttributeUpdate::Remove,
            Ok(value) => AttributeUpdate::Store(value),
            Err(e) => {
                log::debug!("Value for session attribute [{}] is not serializable: {}", key, e);
                AttributeUpdate::Unserializable
            }
        };
        self.apply(ctx, key, update).await
    }

    /// Read a typed attribute. A stored value of another shape reads as `None`.
    pub async fn get_attribute<T: DeserializeOwned>(
        &self,
        ctx: &mut WebContext,
        key: &str,
    ) -> Result<Option<T>, SessionError> {
        let Some(value) = self.get(ctx, key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => {
                log::debug!("Session attribute [{}] has an unexpected shape: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Session id already known for this request, from the cache or the cookie
    fn resolve_session_id(&self, ctx: &WebContext) -> Option<String> {
        if let Some(id) = ctx.request_attribute(SESSION_ID_IN_REQUEST_ATTRIBUTE).filter(|id| !id.trim().is_empty()) {
            log::trace!("Session id [{}] found in request attribute", id);
            return Some(id.to_string());
        }

        let id = self.cookie_manager.read(ctx).filter(|id| !id.trim().is_empty());
        if let Some(id) = &id {
            log::trace!("Session id [{}] found in cookie [{}]", id, self.cookie_manager.cookie_name());
        }
        id
    }

    fn mint_session_id(&self, ctx: &mut WebContext) -> Result<String, SessionError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        log::trace!("Generated session id [{}]", session_id);
        self.cookie_manager.issue(ctx, &session_id)?;
        Ok(session_id)
    }

    /// Active transient ticket of the current session; expired reads as absent
    async fn transient_ticket(
        &self,
        session_id: &str,
    ) -> Result<Option<TransientSessionTicket>, SessionError> {
        let ticket_id = self.ticket_factory.normalize_ticket_id(session_id);
        log::trace!("Fetching session ticket [{}]", ticket_id);

        let Some(record) = self.registry.get_ticket(&ticket_id).await? else {
            return Ok(None);
        };
        let ticket: TransientSessionTicket = record.decode()?;
        if ticket.is_expired() {
            log::trace!("Session ticket [{}] has expired", ticket_id);
            return Ok(None);
        }
        Ok(Some(ticket))
    }

    async fn apply(&self, ctx: &mut WebContext, key: &str, update: AttributeUpdate) -> Result<(), SessionError> {
        let session_id = self.get_or_create_session_id(ctx)?;
        log::trace!("Setting session attribute [{}] for session [{}]", key, session_id);
        let ticket = self.transient_ticket(&session_id).await?;

        match (ticket, update) {
            (Some(mut ticket), AttributeUpdate::Remove) => {
                ticket.properties_mut().remove(key);
                ticket.update();
                self.registry.update_ticket(TicketRecord::encode(&ticket)?).await?;
            }
            (Some(mut ticket), AttributeUpdate::Store(value)) => {
                ticket.properties_mut().insert(key.to_string(), value);
                ticket.update();
                self.registry.update_ticket(TicketRecord::encode(&ticket)?).await?;
            }
            (None, AttributeUpdate::Store(value)) => {
                let mut properties = TicketProperties::new();
                properties.insert(key.to_string(), value);
                let ticket = self.ticket_factory.create(&session_id, properties);
                log::trace!("Creating session ticket [{}]", ticket.id());
                self.registry.add_ticket(TicketRecord::encode(&ticket)?).await?;
            }
            (None, AttributeUpdate::Remove) => {
                log::trace!("No session ticket for [{}]; nothing to remove", session_id);
            }
            (_, AttributeUpdate::Unserializable) => {
                log::debug!("Skipping unserializable value for [{}] in session [{}]", key, session_id);
            }
        }
        Ok(())
    }

    async fn try_destroy(&self, ctx: &mut WebContext) -> Result<String, SessionError> {
        let session_id = self.get_or_create_session_id(ctx)?;
        let ticket_id = self.ticket_factory.normalize_ticket_id(&session_id);
        self.registry.delete_ticket(&ticket_id).await?;
        self.cookie_manager.remove(ctx)?;
        Ok(ticket_id)
    }
}

#[async_trait::async_trait]
impl SessionStore for DistributedSessionStore {
    fn get_or_create_session_id(&self, ctx: &mut WebContext) -> Result<String, SessionError> {
        let session_id = match self.resolve_session_id(ctx) {
            Some(id) => id,
            None => self.mint_session_id(ctx)?,
        };
        ctx.set_request_attribute(SESSION_ID_IN_REQUEST_ATTRIBUTE, session_id.clone());
        Ok(session_id)
    }

    async fn get(&self, ctx: &mut WebContext, key: &str) -> Result<Option<Value>, SessionError> {
        let session_id = self.get_or_create_session_id(ctx)?;
        log::trace!("Getting session attribute [{}] for session [{}]", key, session_id);
        let ticket = self.transient_ticket(&session_id).await?;
        Ok(ticket.and_then(|ticket| ticket.property(key).cloned()))
    }

    async fn set(&self, ctx: &mut WebContext, key: &str, value: Option<Value>) -> Result<(), SessionError> {
        let update = match value {
            None | Some(Value::Null) => AttributeUpdate::Remove,
            Some(value) => AttributeUpdate::Store(value),
        };
        self.apply(ctx, key, update).await
    }

    async fn destroy_session(&self, ctx: &mut WebContext) -> bool {
        match self.try_destroy(ctx).await {
            Ok(ticket_id) => {
                log::trace!("Destroyed session ticket [{}]", ticket_id);
                true
            }
            Err(e) => {
                log::warn!("Failed to destroy session: {}", e);
                false
            }
        }
    }

    fn get_trackable_session(&self, ctx: &mut WebContext) -> Result<TrackableSession, SessionError> {
        let session_id = self.get_or_create_session_id(ctx)?;
        log::trace!("Track session id [{}]", session_id);
        Ok(TrackableSession::new(session_id))
    }

    fn build_from_trackable_session(&self, ctx: &mut WebContext, session: &TrackableSession) -> Option<&Self> {
        if session.as_str().trim().is_empty() {
            log::trace!("Ignoring blank trackable session");
            return None;
        }
        log::trace!("Restoring session id [{}] from trackable session", session);
        ctx.set_request_attribute(SESSION_ID_IN_REQUEST_ATTRIBUTE, session.as_str());
        Some(self)
    }

    async fn renew_session(&self, _ctx: &mut WebContext) -> bool {
        log::trace!("Session renewal is not supported by the distributed session store");
        false
    }
}
