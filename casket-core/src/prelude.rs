//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use casket_core::prelude::*;
//! ```

// === Configuration ===
pub use crate::config::CasketConfig;
pub use crate::logging::{init_logging, LoggingConfig};

// === Per-request exchange ===
pub use crate::web::WebContext;

// === Cookies ===
pub use crate::cookie::{
    Authentication, CookieDescriptor, CookieManager, CookieValueManager, FlowContext, RememberMePolicy,
    SameSitePolicy, SignedCookieValueManager,
};

// === Tickets ===
pub use crate::ticket::{
    ExpirationPolicy, MemoryTicketRegistry, RegistryCleaner, RegistryCleanerConfig, Ticket, TicketRecord,
    TicketRegistry, TransientSessionTicketFactory,
};

// === Sessions ===
pub use crate::session::{DistributedSessionStore, SessionStore, TrackableSession};

// === Errors ===
pub use crate::error::{CookieError, RegistryError, SessionError};

pub use serde_json::json;
