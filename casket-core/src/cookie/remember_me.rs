//! Remember-me detection and lifetime override

use crate::web::WebContext;
use serde_json::Value;
use std::collections::HashMap;

/// Request parameter submitted by a login form when "remember me" is ticked
pub const REQUEST_PARAMETER_REMEMBER_ME: &str = "rememberMe";

/// Authentication attribute recorded when a remember-me login succeeded
pub const AUTHENTICATION_ATTRIBUTE_REMEMBER_ME: &str = "longTermAuthenticationRequestTokenUsed";

/// Three months, in seconds
pub const DEFAULT_REMEMBER_ME_MAX_AGE: i64 = 7_889_231;

/// Comment attached to remember-me cookies
pub const REMEMBER_ME_COOKIE_COMMENT: &str = "Casket Cookie w/ Remember-Me";

/// Max-age override applied to a single cookie write for remember-me logins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberMePolicy {
    pub max_age: i64,
    pub comment: Option<String>,
}

impl Default for RememberMePolicy {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_REMEMBER_ME_MAX_AGE,
            comment: Some(REMEMBER_ME_COOKIE_COMMENT.to_string()),
        }
    }
}

impl RememberMePolicy {
    pub fn with_max_age(max_age: i64) -> Self {
        Self { max_age, ..Self::default() }
    }
}

/// Result of a completed authentication, as far as cookies care
#[derive(Debug, Clone, Default)]
pub struct Authentication {
    pub principal: String,
    pub attributes: HashMap<String, Value>,
}

impl Authentication {
    pub fn new(principal: impl Into<String>) -> Self {
        Self { principal: principal.into(), attributes: HashMap::new() }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// True when the remember-me attribute is `true`, or a list containing `true`
    pub fn is_remember_me(&self) -> bool {
        match self.attributes.get(AUTHENTICATION_ATTRIBUTE_REMEMBER_ME) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Array(values)) => values.contains(&Value::Bool(true)),
            _ => false,
        }
    }
}

/// A login-flow step: the web exchange plus what the flow knows about
/// remember-me and the current authentication.
#[derive(Debug)]
pub struct FlowContext<'a> {
    web: &'a mut WebContext,
    remember_me_enabled: bool,
    authentication: Option<Authentication>,
}

impl<'a> FlowContext<'a> {
    pub fn new(web: &'a mut WebContext) -> Self {
        Self { web, remember_me_enabled: false, authentication: None }
    }

    pub fn with_remember_me_enabled(mut self, enabled: bool) -> Self {
        self.remember_me_enabled = enabled;
        self
    }

    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn web(&self) -> &WebContext {
        self.web
    }

    pub fn web_mut(&mut self) -> &mut WebContext {
        self.web
    }

    pub fn is_remember_me_enabled(&self) -> bool {
        self.remember_me_enabled
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Whether this exchange is a remember-me authentication.
    ///
    /// The request parameter is checked first; the recorded authentication is
    /// only inspected when the parameter does not decide it.
    pub fn is_remember_me_authentication(&self) -> bool {
        if self.is_remember_me_provided_in_request() {
            log::debug!("This request is from a remember-me authentication event");
            return true;
        }
        if self.is_remember_me_recorded_in_authentication() {
            log::debug!("The recorded authentication is from a remember-me request");
            return true;
        }
        false
    }

    fn is_remember_me_provided_in_request(&self) -> bool {
        let value = self.web.parameter(REQUEST_PARAMETER_REMEMBER_ME);
        log::debug!(
            "Locating request parameter [{}] with value [{:?}]",
            REQUEST_PARAMETER_REMEMBER_ME,
            value
        );
        value.is_some_and(|v| !v.trim().is_empty()) && self.remember_me_enabled
    }

    fn is_remember_me_recorded_in_authentication(&self) -> bool {
        let Some(authentication) = &self.authentication else {
            return false;
        };
        let remember_me = authentication.is_remember_me();
        log::debug!(
            "Located remember-me authentication attribute [{}] for [{}]",
            remember_me,
            authentication.principal
        );
        remember_me
    }
}
