//! Session cookie configuration

use super::{parse_bool, EnvLookup};
use crate::cookie::{
    CookieDescriptor, CookieManager, CookieValueManager, NoOpCookieValueManager, RememberMePolicy,
    SameSitePolicy, SignedCookieValueManager, DEFAULT_COOKIE_COMMENT, DEFAULT_REMEMBER_ME_MAX_AGE,
    MAX_COOKIE_MAX_AGE, MIN_SIGNING_KEY_LEN, SESSION_COOKIE_MAX_AGE,
};
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    /// Cookie name
    /// Env: CASKET_COOKIE_NAME
    /// Default: "DISSESSION"
    pub name: String,

    /// Cookie path
    /// Env: CASKET_COOKIE_PATH
    /// Default: "/"
    pub path: String,

    /// Cookie domain; empty means the request host
    /// Env: CASKET_COOKIE_DOMAIN
    /// Default: ""
    pub domain: String,

    /// Max-age in seconds; -1 for a browser-session cookie
    /// Env: CASKET_COOKIE_MAX_AGE
    /// Default: -1
    pub max_age: i64,

    /// Set Secure flag on cookies (HTTPS only)
    /// Env: CASKET_COOKIE_SECURE
    /// Default: true
    pub secure: bool,

    /// Set HttpOnly flag on cookies
    /// Env: CASKET_COOKIE_HTTPONLY
    /// Default: true
    pub http_only: bool,

    /// SameSite policy: "Strict", "Lax", "None", or empty to omit
    /// Env: CASKET_COOKIE_SAMESITE
    /// Default: "Lax"
    pub same_site: String,

    /// Cookie comment; empty to omit
    /// Env: CASKET_COOKIE_COMMENT
    /// Default: "Casket Cookie"
    pub comment: String,

    /// Max-age applied to remember-me authentications
    /// Env: CASKET_REMEMBER_ME_MAX_AGE
    /// Default: 7889231 (about three months)
    pub remember_me_max_age: i64,

    pub signing: SigningSettings,
}

/// Cookie value signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Sign cookie values
    /// Env: CASKET_COOKIE_SIGNING_ENABLED
    /// Default: false
    pub enabled: bool,

    /// Base64 signing key, at least 32 bytes once decoded
    /// Env: CASKET_COOKIE_SIGNING_KEY
    pub key: String,

    /// Bind cookie values to the client IP and User-Agent
    /// Env: CASKET_COOKIE_PIN_TO_CLIENT
    /// Default: true
    pub pin_to_client: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "DISSESSION".to_string(),
            path: "/".to_string(),
            domain: String::new(),
            max_age: SESSION_COOKIE_MAX_AGE,
            secure: true,
            http_only: true,
            same_site: "Lax".to_string(),
            comment: DEFAULT_COOKIE_COMMENT.to_string(),
            remember_me_max_age: DEFAULT_REMEMBER_ME_MAX_AGE,
            signing: SigningSettings::default(),
        }
    }
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self { enabled: false, key: String::new(), pin_to_client: true }
    }
}

impl CookieSettings {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self, env: EnvLookup<'_>) {
        if let Some(name) = env("CASKET_COOKIE_NAME") {
            self.name = name;
        }

        if let Some(path) = env("CASKET_COOKIE_PATH") {
            self.path = path;
        }

        if let Some(domain) = env("CASKET_COOKIE_DOMAIN") {
            self.domain = domain;
        }

        if let Some(max_age) = env("CASKET_COOKIE_MAX_AGE") {
            if let Ok(m) = max_age.parse() {
                self.max_age = m;
            }
        }

        if let Some(secure) = env("CASKET_COOKIE_SECURE") {
            self.secure = parse_bool(&secure).unwrap_or(true);
        }

        if let Some(http_only) = env("CASKET_COOKIE_HTTPONLY") {
            self.http_only = parse_bool(&http_only).unwrap_or(true);
        }

        if let Some(same_site) = env("CASKET_COOKIE_SAMESITE") {
            self.same_site = same_site;
        }

        if let Some(comment) = env("CASKET_COOKIE_COMMENT") {
            self.comment = comment;
        }

        if let Some(max_age) = env("CASKET_REMEMBER_ME_MAX_AGE") {
            if let Ok(m) = max_age.parse() {
                self.remember_me_max_age = m;
            }
        }

        if let Some(enabled) = env("CASKET_COOKIE_SIGNING_ENABLED") {
            self.signing.enabled = parse_bool(&enabled).unwrap_or(false);
        }

        if let Some(key) = env("CASKET_COOKIE_SIGNING_KEY") {
            self.signing.key = key;
        }

        if let Some(pin) = env("CASKET_COOKIE_PIN_TO_CLIENT") {
            self.signing.pin_to_client = parse_bool(&pin).unwrap_or(true);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Invalid cookie name: must not be empty");
        }

        if !self.path.starts_with('/') {
            bail!("Invalid cookie path '{}': must start with '/'", self.path);
        }

        if self.max_age < SESSION_COOKIE_MAX_AGE || self.max_age > MAX_COOKIE_MAX_AGE {
            bail!(
                "Invalid cookie max_age {}: must be between -1 and {}",
                self.max_age,
                MAX_COOKIE_MAX_AGE
            );
        }

        if self.remember_me_max_age <= 0 || self.remember_me_max_age > MAX_COOKIE_MAX_AGE {
            bail!(
                "Invalid remember_me_max_age {}: must be between 1 and {}",
                self.remember_me_max_age,
                MAX_COOKIE_MAX_AGE
            );
        }

        if let Some(SameSitePolicy::None) = self.same_site_policy()? {
            if !self.secure {
                bail!("Invalid cookie same_site: None requires secure = true");
            }
        }

        if self.signing.enabled {
            let key = decode_key(&self.signing.key)?;
            if key.len() < MIN_SIGNING_KEY_LEN {
                bail!(
                    "Invalid signing key: {} bytes, at least {} required",
                    key.len(),
                    MIN_SIGNING_KEY_LEN
                );
            }
        }

        Ok(())
    }

    /// Parsed SameSite policy; empty means none
    pub fn same_site_policy(&self) -> Result<Option<SameSitePolicy>> {
        let same_site = self.same_site.trim();
        if same_site.is_empty() {
            return Ok(None);
        }
        same_site
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid cookie same_site: {}", e))
    }

    pub fn descriptor(&self) -> Result<CookieDescriptor> {
        let comment = Some(self.comment.clone()).filter(|c| !c.trim().is_empty());
        Ok(CookieDescriptor::new(self.name.clone())
            .with_path(self.path.clone())
            .with_domain(self.domain.clone())
            .with_max_age(self.max_age)
            .with_secure(self.secure)
            .with_http_only(self.http_only)
            .with_same_site(self.same_site_policy()?)
            .with_comment(comment))
    }

    pub fn remember_me_policy(&self) -> RememberMePolicy {
        RememberMePolicy::with_max_age(self.remember_me_max_age)
    }

    pub fn value_manager(&self) -> Result<Arc<dyn CookieValueManager>> {
        if !self.signing.enabled {
            return Ok(Arc::new(NoOpCookieValueManager));
        }
        let key = decode_key(&self.signing.key)?;
        let signer = SignedCookieValueManager::new(key)
            .context("Failed to create cookie signer")?
            .with_client_pinning(self.signing.pin_to_client);
        Ok(Arc::new(signer))
    }

    /// Build the session cookie manager
    pub fn cookie_manager(&self) -> Result<CookieManager> {
        Ok(CookieManager::new(self.descriptor()?)
            .with_value_manager(self.value_manager()?)
            .with_remember_me_policy(self.remember_me_policy()))
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        bail!("Invalid signing key: required when signing is enabled");
    }
    STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')))
        .context("Invalid signing key: not base64")
}
