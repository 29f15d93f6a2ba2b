//! Distributed session tracking
//!
//! The client holds only an opaque session id in a cookie; the attributes of
//! the session live in a transient session ticket in the ticket registry, so
//! any node sharing the registry can serve the next request.
//!
//! Within one request the resolved session id is memoized in a request
//! attribute of the [`WebContext`](crate::web::WebContext): the cookie is read
//! at most once, and a new id is minted (and its cookie issued) at most once.
//!
//! # Example
//!
//! ```no_run
//! use casket_core::config::CasketConfig;
//! use casket_core::session::{DistributedSessionStore, SessionStore};
//! use casket_core::ticket::MemoryTicketRegistry;
//! use casket_core::web::WebContext;
//! use std::sync::Arc;
//!
//! # async fn example(request: http::Request<()>) -> anyhow::Result<()> {
//! let store = DistributedSessionStore::from_config(
//!     Arc::new(MemoryTicketRegistry::new()),
//!     &CasketConfig::load()?,
//! )?;
//!
//! let mut ctx = WebContext::from_request(&request);
//! store.set_attribute(&mut ctx, "client_name", "GitHubClient").await?;
//! let client: Option<String> = store.get_attribute(&mut ctx, "client_name").await?;
//! # Ok(())
//! # }
//! ```

mod distributed;

#[cfg(test)]
mod security_tests;

pub use distributed::{DistributedSessionStore, SESSION_ID_IN_REQUEST_ATTRIBUTE};

use crate::error::SessionError;
use crate::web::WebContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Exported reference to a resolved session, used to resume the same
/// session on the far side of a redirect or another abstraction boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackableSession(String);

impl TrackableSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self(session_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackableSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TrackableSession {
    fn from(session_id: String) -> Self {
        Self(session_id)
    }
}

/// Request-scoped key/value session contract
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve the session id for this request, minting one (and issuing its
    /// cookie) when the request carries none. Never returns a blank id.
    fn get_or_create_session_id(&self, ctx: &mut WebContext) -> Result<String, SessionError>;

    /// Read one attribute. Missing, expired and never-created sessions all
    /// read as `None`.
    async fn get(&self, ctx: &mut WebContext, key: &str) -> Result<Option<Value>, SessionError>;

    /// Write one attribute; `None` (or JSON `null`) removes it
    async fn set(&self, ctx: &mut WebContext, key: &str, value: Option<Value>) -> Result<(), SessionError>;

    /// Delete the session's ticket and expire its cookie.
    /// Returns `false` if anything failed along the way.
    async fn destroy_session(&self, ctx: &mut WebContext) -> bool;

    /// Export the current session for later resumption
    fn get_trackable_session(&self, ctx: &mut WebContext) -> Result<TrackableSession, SessionError>;

    /// Make `session` the current session of this request, without touching
    /// cookies or the registry. Returns `None` for a blank token.
    fn build_from_trackable_session(&self, ctx: &mut WebContext, session: &TrackableSession) -> Option<&Self>
    where
        Self: Sized;

    /// Issue a fresh id for the current session
    async fn renew_session(&self, ctx: &mut WebContext) -> bool;
}
