//! Cookie identity and `Set-Cookie` rendering

use crate::error::CookieError;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Max-age marking a browser-session cookie (no `Max-Age`/`Expires` sent)
pub const SESSION_COOKIE_MAX_AGE: i64 = -1;

/// Comment attached to cookies issued by this crate
pub const DEFAULT_COOKIE_COMMENT: &str = "Casket Cookie";

/// Upper bound for any max-age written to a cookie (400 days)
pub const MAX_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// SameSite cookie policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSitePolicy {
    /// Strict - cookie only sent to same site
    Strict,

    /// Lax - cookie sent on top-level navigation
    Lax,

    /// None - cookie sent on all requests (requires Secure)
    None,
}

impl SameSitePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSitePolicy::Strict => "Strict",
            SameSitePolicy::Lax => "Lax",
            SameSitePolicy::None => "None",
        }
    }
}

impl fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSitePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Strict" => Ok(SameSitePolicy::Strict),
            "Lax" => Ok(SameSitePolicy::Lax),
            "None" => Ok(SameSitePolicy::None),
            other => Err(format!("unknown SameSite policy '{}'", other)),
        }
    }
}

/// Whether `value` is a valid RFC 6265 `cookie-value`.
///
/// Zero or more cookie-octets, optionally wrapped in double quotes.
pub fn is_valid_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner.bytes().all(is_cookie_octet)
}

fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Immutable cookie configuration.
///
/// The domain is never the empty string: blank domains are stored as `None`
/// so the browser falls back to the request host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    name: String,
    path: String,
    domain: Option<String>,
    max_age: i64,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSitePolicy>,
    comment: Option<String>,
}

impl CookieDescriptor {
    /// Create a descriptor for a browser-session cookie on `/`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            domain: None,
            max_age: SESSION_COOKIE_MAX_AGE,
            secure: true,
            http_only: true,
            same_site: None,
            comment: Some(DEFAULT_COOKIE_COMMENT.to_string()),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain; an empty or blank domain means "unset"
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.domain = if domain.trim().is_empty() { None } else { Some(domain) };
        self
    }

    /// Max age in seconds; [`SESSION_COOKIE_MAX_AGE`] for a session cookie
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: Option<SameSitePolicy>) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSitePolicy> {
        self.same_site
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Build a `Set-Cookie` header value.
    ///
    /// `max_age` and `comment` are passed per write so a remember-me override
    /// never leaks into the descriptor. Values outside the cookie-octet set
    /// are rejected.
    pub fn render(&self, value: &str, max_age: i64, comment: Option<&str>) -> Result<String, CookieError> {
        if !is_valid_cookie_value(value) {
            return Err(CookieError::InvalidValue { name: self.name.clone() });
        }

        let mut parts = vec![format!("{}={}", self.name, value)];

        if let Some(comment) = comment {
            parts.push(format!("Comment={}", comment));
        }

        if let Some(ref domain) = self.domain {
            parts.push(format!("Domain={}", domain));
        }

        parts.push(format!("Path={}", self.path));

        if max_age >= 0 {
            parts.push(format!("Max-Age={}", max_age));
            let expires = Duration::try_seconds(max_age).and_then(|ttl| Utc::now().checked_add_signed(ttl));
            if let Some(expires) = expires {
                parts.push(format!("Expires={}", expires.format(EXPIRES_FORMAT)));
            }
        }

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        if let Some(same_site) = self.same_site {
            parts.push(format!("SameSite={}", same_site));
        }

        Ok(parts.join("; "))
    }

    /// Build the header that deletes this cookie (empty value, `Max-Age=0`)
    pub fn render_removal(&self) -> String {
        let mut parts = vec![format!("{}=", self.name)];
        if let Some(ref domain) = self.domain {
            parts.push(format!("Domain={}", domain));
        }
        parts.push(format!("Path={}", self.path));
        parts.push("Max-Age=0".to_string());
        parts.push("Expires=Thu, 01 Jan 1970 00:00:00 GMT".to_string());
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_is_unset() {
        let descriptor = CookieDescriptor::new("SESSION").with_domain("");
        assert_eq!(descriptor.domain(), None);

        let descriptor = CookieDescriptor::new("SESSION").with_domain("   ");
        assert_eq!(descriptor.domain(), None);
        assert!(!descriptor.render("v", 10, None).unwrap().contains("Domain="));
    }

    #[test]
    fn test_render_full_cookie() {
        let descriptor = CookieDescriptor::new("SESSION")
            .with_domain("sso.example.org")
            .with_path("/cas")
            .with_max_age(3600)
            .with_same_site(Some(SameSitePolicy::Strict));

        let set_cookie = descriptor.render("abc123", descriptor.max_age(), descriptor.comment()).unwrap();

        assert!(set_cookie.starts_with("SESSION=abc123; "));
        assert!(set_cookie.contains("Comment=Casket Cookie"));
        assert!(set_cookie.contains("Domain=sso.example.org"));
        assert!(set_cookie.contains("Path=/cas"));
        assert!(set_cookie.contains("Max-Age=3600"));
        assert!(set_cookie.contains("Expires="));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_session_cookie_has_no_expiry() {
        let descriptor = CookieDescriptor::new("SESSION").with_secure(false).with_http_only(false);
        let set_cookie = descriptor.render("v", SESSION_COOKIE_MAX_AGE, None).unwrap();

        assert_eq!(set_cookie, "SESSION=v; Path=/");
    }

    #[test]
    fn test_render_removal() {
        let descriptor = CookieDescriptor::new("SESSION").with_domain("example.org");
        let removal = descriptor.render_removal();

        assert!(removal.starts_with("SESSION=; "));
        assert!(removal.contains("Domain=example.org"));
        assert!(removal.contains("Max-Age=0"));
        assert!(removal.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn test_render_rejects_attribute_injection() {
        let descriptor = CookieDescriptor::new("SESSION").with_domain("sso.example.org");

        for value in ["abc; Domain=evil.example", "a b", "a,b", "a\\b", "caf\u{e9}", "\"abc"] {
            let err = descriptor.render(value, 10, None).unwrap_err();
            assert!(matches!(err, CookieError::InvalidValue { ref name } if name == "SESSION"), "{value}");
        }
    }

    #[test]
    fn test_render_accepts_cookie_octets() {
        let descriptor = CookieDescriptor::new("SESSION");

        for value in ["", "\"quoted\"", "5f0c-AB_z.sig~!#$%&'()*+-./:<=>?@[]^`{|}"] {
            assert!(descriptor.render(value, SESSION_COOKIE_MAX_AGE, None).is_ok(), "{value}");
        }
    }

    #[test]
    fn test_huge_max_age_omits_expires() {
        let descriptor = CookieDescriptor::new("SESSION");
        let set_cookie = descriptor.render("v", i64::MAX / 2, None).unwrap();

        assert!(set_cookie.contains(&format!("Max-Age={}", i64::MAX / 2)));
        assert!(!set_cookie.contains("Expires="));
    }

    #[test]
    fn test_same_site_parse() {
        assert_eq!("Lax".parse::<SameSitePolicy>(), Ok(SameSitePolicy::Lax));
        assert!("lax".parse::<SameSitePolicy>().is_err());
    }
}
