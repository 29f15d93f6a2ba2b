//! Cookie value transforms

use crate::error::CookieValueError;
use crate::web::WebContext;
use std::sync::Arc;

/// Encodes values before they go on the wire and decodes them on the way back.
///
/// Implementations may sign, encrypt or bind the value to the client. A decode
/// failure means the cookie is unusable; callers treat it like a missing cookie.
pub trait CookieValueManager: Send + Sync {
    /// Turn a raw value into the string written to the cookie
    fn encode(&self, value: &str, request: &WebContext) -> Result<String, CookieValueError>;

    /// Recover the raw value from a cookie received with `request`
    fn decode(&self, cookie_value: &str, request: &WebContext) -> Result<String, CookieValueError>;
}

impl<M: CookieValueManager + ?Sized> CookieValueManager for Arc<M> {
    fn encode(&self, value: &str, request: &WebContext) -> Result<String, CookieValueError> {
        (**self).encode(value, request)
    }

    fn decode(&self, cookie_value: &str, request: &WebContext) -> Result<String, CookieValueError> {
        (**self).decode(cookie_value, request)
    }
}

/// Pass-through transform
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCookieValueManager;

impl CookieValueManager for NoOpCookieValueManager {
    fn encode(&self, value: &str, _request: &WebContext) -> Result<String, CookieValueError> {
        Ok(value.to_string())
    }

    fn decode(&self, cookie_value: &str, _request: &WebContext) -> Result<String, CookieValueError> {
        Ok(cookie_value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    #[test]
    fn test_noop_round_trip() {
        let ctx = WebContext::from_request(&Request::new(()));
        let manager = NoOpCookieValueManager;

        let encoded = manager.encode("session-id", &ctx).unwrap();
        assert_eq!(encoded, "session-id");
        assert_eq!(manager.decode(&encoded, &ctx).unwrap(), "session-id");
    }
}
