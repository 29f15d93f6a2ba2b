//! Cookie issuance, retrieval and removal

use super::descriptor::CookieDescriptor;
use super::remember_me::{FlowContext, RememberMePolicy};
use super::value::{CookieValueManager, NoOpCookieValueManager};
use crate::error::CookieError;
use crate::web::WebContext;
use std::sync::Arc;

/// Issues, reads and removes one named cookie.
///
/// Holds only immutable configuration, so a single manager can serve any
/// number of concurrent requests.
#[derive(Clone)]
pub struct CookieManager {
    descriptor: CookieDescriptor,
    value_manager: Arc<dyn CookieValueManager>,
    remember_me: RememberMePolicy,
}

impl std::fmt::Debug for CookieManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieManager")
            .field("descriptor", &self.descriptor)
            .field("remember_me", &self.remember_me)
            .finish_non_exhaustive()
    }
}

impl CookieManager {
    /// Create a manager with a pass-through value transform
    pub fn new(descriptor: CookieDescriptor) -> Self {
        Self {
            descriptor,
            value_manager: Arc::new(NoOpCookieValueManager),
            remember_me: RememberMePolicy::default(),
        }
    }

    pub fn with_value_manager(mut self, value_manager: Arc<dyn CookieValueManager>) -> Self {
        self.value_manager = value_manager;
        self
    }

    pub fn with_remember_me_policy(mut self, policy: RememberMePolicy) -> Self {
        self.remember_me = policy;
        self
    }

    pub fn descriptor(&self) -> &CookieDescriptor {
        &self.descriptor
    }

    pub fn remember_me_policy(&self) -> &RememberMePolicy {
        &self.remember_me
    }

    pub fn cookie_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Issue the cookie for a login-flow step.
    ///
    /// A remember-me authentication gets the policy's max-age and comment;
    /// every other attribute comes from the descriptor either way.
    pub fn issue_for_flow(&self, flow: &mut FlowContext<'_>, value: &str) -> Result<(), CookieError> {
        let wire_value = self.encode(value, flow.web())?;

        let header = if flow.is_remember_me_authentication() {
            log::debug!(
                "Creating cookie [{}] for remember-me authentication with max-age [{}]",
                self.cookie_name(),
                self.remember_me.max_age
            );
            self.descriptor.render(
                &wire_value,
                self.remember_me.max_age,
                self.remember_me.comment.as_deref(),
            )?
        } else {
            log::debug!("Creating cookie [{}]", self.cookie_name());
            self.render_default(&wire_value)?
        };

        flow.web_mut().add_set_cookie(self.cookie_name(), header)
    }

    /// Issue the cookie with the descriptor's settings, ignoring remember-me
    pub fn issue(&self, ctx: &mut WebContext, value: &str) -> Result<(), CookieError> {
        let wire_value = self.encode(value, ctx)?;
        log::debug!("Creating cookie [{}]", self.cookie_name());
        let header = self.render_default(&wire_value)?;
        ctx.add_set_cookie(self.cookie_name(), header)
    }

    /// Read and decode the cookie.
    ///
    /// A missing cookie and one that fails to decode both yield `None`.
    pub fn read(&self, ctx: &WebContext) -> Option<String> {
        let cookie_value = ctx.cookie(self.cookie_name())?;
        match self.value_manager.decode(cookie_value, ctx) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Discarding cookie [{}]: {}", self.cookie_name(), e);
                None
            }
        }
    }

    /// Expire the cookie on the client
    pub fn remove(&self, ctx: &mut WebContext) -> Result<(), CookieError> {
        log::debug!("Removing cookie [{}]", self.cookie_name());
        ctx.add_set_cookie(self.cookie_name(), self.descriptor.render_removal())
    }

    fn encode(&self, value: &str, ctx: &WebContext) -> Result<String, CookieError> {
        self.value_manager.encode(value, ctx).map_err(|source| CookieError::Encode {
            name: self.cookie_name().to_string(),
            source,
        })
    }

    fn render_default(&self, wire_value: &str) -> Result<String, CookieError> {
        self.descriptor.render(wire_value, self.descriptor.max_age(), self.descriptor.comment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::remember_me::{Authentication, AUTHENTICATION_ATTRIBUTE_REMEMBER_ME};
    use crate::cookie::SameSitePolicy;
    use crate::error::CookieValueError;
    use crate::testing::{parse_set_cookie, web_context};
    use serde_json::json;

    fn descriptor() -> CookieDescriptor {
        CookieDescriptor::new("TGC")
            .with_path("/cas")
            .with_domain("sso.example.org")
            .with_max_age(7200)
            .with_same_site(Some(SameSitePolicy::Lax))
    }

    struct RejectingValueManager;

    impl CookieValueManager for RejectingValueManager {
        fn encode(&self, value: &str, _request: &WebContext) -> Result<String, CookieValueError> {
            Ok(format!("enc:{}", value))
        }

        fn decode(&self, _cookie_value: &str, _request: &WebContext) -> Result<String, CookieValueError> {
            Err(CookieValueError::SignatureMismatch)
        }
    }

    #[test]
    fn test_remember_me_parameter_overrides_max_age_only() {
        let manager = CookieManager::new(descriptor()).with_remember_me_policy(RememberMePolicy::with_max_age(1000));
        let mut ctx = web_context("/login?rememberMe=true", None);

        let mut flow = FlowContext::new(&mut ctx).with_remember_me_enabled(true);
        manager.issue_for_flow(&mut flow, "TGT-1").unwrap();

        let headers = ctx.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        let cookie = parse_set_cookie(headers[0]);
        assert_eq!(cookie.value, "TGT-1");
        assert_eq!(cookie.attribute("Max-Age"), Some("1000"));
        assert_eq!(cookie.attribute("Path"), Some("/cas"));
        assert_eq!(cookie.attribute("Domain"), Some("sso.example.org"));
        assert_eq!(cookie.attribute("SameSite"), Some("Lax"));
        assert_eq!(cookie.attribute("Comment"), Some("Casket Cookie w/ Remember-Me"));
        assert!(cookie.has_flag("Secure"));
        assert!(cookie.has_flag("HttpOnly"));
    }

    #[test]
    fn test_remember_me_recorded_in_authentication() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/login", None);
        let auth = Authentication::new("casuser")
            .with_attribute(AUTHENTICATION_ATTRIBUTE_REMEMBER_ME, json!(true));

        let mut flow = FlowContext::new(&mut ctx).with_authentication(auth);
        manager.issue_for_flow(&mut flow, "TGT-1").unwrap();

        let cookie = parse_set_cookie(ctx.set_cookie_headers()[0]);
        assert_eq!(cookie.attribute("Max-Age"), Some("7889231"));
    }

    #[test]
    fn test_no_remember_me_uses_descriptor_max_age() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/login?rememberMe=true", None);

        // Parameter present but remember-me not enabled for this flow
        let mut flow = FlowContext::new(&mut ctx);
        manager.issue_for_flow(&mut flow, "TGT-1").unwrap();

        let cookie = parse_set_cookie(ctx.set_cookie_headers()[0]);
        assert_eq!(cookie.attribute("Max-Age"), Some("7200"));
        assert_eq!(cookie.attribute("Comment"), Some("Casket Cookie"));
        assert_eq!(manager.descriptor().max_age(), 7200);
    }

    #[test]
    fn test_plain_issue_ignores_remember_me_parameter() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/login?rememberMe=true", None);

        manager.issue(&mut ctx, "abc").unwrap();

        let cookie = parse_set_cookie(ctx.set_cookie_headers()[0]);
        assert_eq!(cookie.attribute("Max-Age"), Some("7200"));
    }

    #[test]
    fn test_issue_applies_value_transform() {
        let manager = CookieManager::new(descriptor()).with_value_manager(Arc::new(RejectingValueManager));
        let mut ctx = web_context("/", None);

        manager.issue(&mut ctx, "abc").unwrap();

        assert_eq!(parse_set_cookie(ctx.set_cookie_headers()[0]).value, "enc:abc");
    }

    #[test]
    fn test_read_missing_and_present() {
        let manager = CookieManager::new(descriptor());
        assert_eq!(manager.read(&web_context("/", None)), None);
        assert_eq!(manager.read(&web_context("/", Some("TGC=TGT-9"))), Some("TGT-9".to_string()));
    }

    #[test]
    fn test_read_undecodable_is_absent() {
        let manager = CookieManager::new(descriptor()).with_value_manager(Arc::new(RejectingValueManager));
        let corrupt = web_context("/", Some("TGC=tampered"));
        let missing = web_context("/", None);

        assert_eq!(manager.read(&corrupt), None);
        assert_eq!(manager.read(&corrupt), manager.read(&missing));
    }

    #[test]
    fn test_remove_expires_cookie() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/login?rememberMe=true", Some("TGC=TGT-9"));

        manager.remove(&mut ctx).unwrap();

        let cookie = parse_set_cookie(ctx.set_cookie_headers()[0]);
        assert_eq!(cookie.name, "TGC");
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.attribute("Max-Age"), Some("0"));
        assert_eq!(cookie.attribute("Path"), Some("/cas"));
        assert_eq!(cookie.attribute("Domain"), Some("sso.example.org"));
    }

    #[test]
    fn test_invalid_value_fails_write() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/", None);

        let result = manager.issue(&mut ctx, "line\nbreak");
        assert!(matches!(result, Err(CookieError::InvalidValue { .. })));
        assert!(ctx.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_value_cannot_inject_attributes() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/", None);

        let result = manager.issue(&mut ctx, "abc; Domain=evil.example; Path=/x");
        assert!(matches!(result, Err(CookieError::InvalidValue { ref name }) if name == "TGC"));
        assert!(ctx.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_remember_me_value_cannot_inject_attributes() {
        let manager = CookieManager::new(descriptor());
        let mut ctx = web_context("/login?rememberMe=true", None);
        let mut flow = FlowContext::new(&mut ctx).with_remember_me_enabled(true);

        let result = manager.issue_for_flow(&mut flow, "abc;Secure");
        assert!(matches!(result, Err(CookieError::InvalidValue { .. })));
        assert!(ctx.set_cookie_headers().is_empty());
    }
}
