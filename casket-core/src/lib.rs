//! Casket - Core
//!
//! Cookie-mediated, ticket-backed distributed sessions for single sign-on
//! servers.
//!
//! # Overview
//!
//! A browser carries only an opaque session id in a cookie. The session's
//! attributes live in a transient session ticket inside a ticket registry
//! shared by every node, so any node can serve the next request of a flow
//! (a delegated-authentication redirect, a login spanning several pages).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use casket_core::prelude::*;
//! use std::sync::Arc;
//!
//! let config = CasketConfig::load()?;
//! let registry = Arc::new(MemoryTicketRegistry::new());
//! let store = DistributedSessionStore::from_config(registry, &config)?;
//!
//! // Per request
//! let mut ctx = WebContext::from_request(&request);
//! store.set(&mut ctx, "client_name", Some(json!("GitHubClient"))).await?;
//! ctx.apply_to(&mut response);
//! ```
//!
//! # Architecture
//!
//! - [`web`] - Per-request exchange: headers, parameters, request attributes, `Set-Cookie` output
//! - [`cookie`] - Cookie descriptor, value transforms (plain or HMAC-signed) and remember-me
//! - [`ticket`] - Tickets, expiration policies, the registry trait and an in-memory registry
//! - [`session`] - The session store contract and the distributed implementation
//! - [`config`] - TOML and environment configuration
//! - [`logging`] - Console logger for the `log` facade

pub mod config;
pub mod cookie;
pub mod error;
pub mod logging;
pub mod session;
pub mod ticket;
pub mod web;

#[cfg(test)]
mod testing;

pub mod prelude;

pub use config::CasketConfig;
pub use cookie::{CookieDescriptor, CookieManager};
pub use error::{CookieError, RegistryError, SessionError};
pub use session::{DistributedSessionStore, SessionStore, TrackableSession};
pub use ticket::{MemoryTicketRegistry, TicketRegistry};
pub use web::WebContext;
