//! Cookie management
//!
//! A [`CookieManager`] owns the identity of one cookie ([`CookieDescriptor`])
//! and its lifecycle: issue, read, remove. Values pass through a pluggable
//! [`CookieValueManager`] on the way out and back in, and a login flow can
//! stretch the cookie lifetime for remember-me authentications.
//!
//! # Example
//!
//! ```no_run
//! use casket_core::cookie::{CookieDescriptor, CookieManager, SignedCookieValueManager};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let signer = SignedCookieValueManager::new(SignedCookieValueManager::generate_key())?;
//! let manager = CookieManager::new(
//!     CookieDescriptor::new("TGC").with_path("/cas").with_max_age(-1),
//! )
//! .with_value_manager(Arc::new(signer));
//! # Ok(())
//! # }
//! ```

mod descriptor;
mod manager;
mod remember_me;
mod signed;
mod value;

pub use descriptor::{
    is_valid_cookie_value, CookieDescriptor, SameSitePolicy, DEFAULT_COOKIE_COMMENT, MAX_COOKIE_MAX_AGE,
    SESSION_COOKIE_MAX_AGE,
};
pub use manager::CookieManager;
pub use remember_me::{
    Authentication, FlowContext, RememberMePolicy, AUTHENTICATION_ATTRIBUTE_REMEMBER_ME,
    DEFAULT_REMEMBER_ME_MAX_AGE, REMEMBER_ME_COOKIE_COMMENT, REQUEST_PARAMETER_REMEMBER_ME,
};
pub use signed::{SignedCookieValueManager, MIN_SIGNING_KEY_LEN};
pub use value::{CookieValueManager, NoOpCookieValueManager};
