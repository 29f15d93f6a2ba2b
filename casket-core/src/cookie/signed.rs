//! HMAC-signed cookie values, optionally pinned to the issuing client

use super::value::CookieValueManager;
use crate::error::CookieValueError;
use crate::web::WebContext;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted signing key length in bytes
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Payload signed when client pinning is on
#[derive(Debug, Serialize, Deserialize)]
struct PinnedValue {
    value: String,
    client_ip: String,
    user_agent: String,
}

/// Signs cookie values with HMAC-SHA256.
///
/// Wire form: `base64url(payload).base64url(mac)`. With client pinning the
/// payload also records the client IP and User-Agent seen at issue time, and
/// a cookie presented by any other client fails to decode.
#[derive(Clone)]
pub struct SignedCookieValueManager {
    key: Vec<u8>,
    pin_to_client: bool,
}

impl std::fmt::Debug for SignedCookieValueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCookieValueManager")
            .field("key", &"<redacted>")
            .field("pin_to_client", &self.pin_to_client)
            .finish()
    }
}

impl SignedCookieValueManager {
    /// Create a manager; keys shorter than [`MIN_SIGNING_KEY_LEN`] are rejected
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, CookieValueError> {
        let key = key.into();
        if key.len() < MIN_SIGNING_KEY_LEN {
            return Err(CookieValueError::InvalidKey(format!(
                "key is {} bytes, at least {} required",
                key.len(),
                MIN_SIGNING_KEY_LEN
            )));
        }
        Ok(Self { key, pin_to_client: true })
    }

    /// Create a manager from a base64 (standard or url-safe) encoded key
    pub fn from_base64_key(encoded: &str) -> Result<Self, CookieValueError> {
        let encoded = encoded.trim();
        let key = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')))
            .map_err(|e| CookieValueError::InvalidKey(format!("key is not base64: {}", e)))?;
        Self::new(key)
    }

    /// Generate a random 64-byte signing key
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; 64];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    /// Bind issued values to the client IP and User-Agent (on by default)
    pub fn with_client_pinning(mut self, pin_to_client: bool) -> Self {
        self.pin_to_client = pin_to_client;
        self
    }

    fn mac(&self) -> Result<HmacSha256, CookieValueError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| CookieValueError::InvalidKey(e.to_string()))
    }

    fn sign(&self, payload: &[u8]) -> Result<String, CookieValueError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Verify signature using constant-time comparison
    fn verify(&self, payload: &[u8], signature: &str) -> Result<(), CookieValueError> {
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| CookieValueError::Malformed(format!("signature is not base64: {}", e)))?;
        let mut mac = self.mac()?;
        mac.update(payload);
        mac.verify_slice(&signature).map_err(|_| CookieValueError::SignatureMismatch)
    }
}

fn client_ip(request: &WebContext) -> String {
    request.remote_addr().map(|ip| ip.to_string()).unwrap_or_default()
}

fn user_agent(request: &WebContext) -> String {
    request.user_agent().unwrap_or_default().to_string()
}

impl CookieValueManager for SignedCookieValueManager {
    fn encode(&self, value: &str, request: &WebContext) -> Result<String, CookieValueError> {
        let payload = if self.pin_to_client {
            serde_json::to_string(&PinnedValue {
                value: value.to_string(),
                client_ip: client_ip(request),
                user_agent: user_agent(request),
            })?
        } else {
            value.to_string()
        };

        let signature = self.sign(payload.as_bytes())?;
        Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(payload.as_bytes()), signature))
    }

    fn decode(&self, cookie_value: &str, request: &WebContext) -> Result<String, CookieValueError> {
        let (encoded_payload, signature) = cookie_value
            .split_once('.')
            .ok_or_else(|| CookieValueError::Malformed("missing signature".to_string()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded_payload)
            .map_err(|e| CookieValueError::Malformed(format!("payload is not base64: {}", e)))?;
        self.verify(&payload, signature)?;

        let payload = String::from_utf8(payload)
            .map_err(|_| CookieValueError::Malformed("payload is not UTF-8".to_string()))?;

        if !self.pin_to_client {
            return Ok(payload);
        }

        let pinned: PinnedValue = serde_json::from_str(&payload)?;
        let current_ip = client_ip(request);
        if pinned.client_ip != current_ip {
            return Err(CookieValueError::ClientMismatch(format!(
                "issued to IP [{}], presented by [{}]",
                pinned.client_ip, current_ip
            )));
        }
        if pinned.user_agent != user_agent(request) {
            return Err(CookieValueError::ClientMismatch("user agent changed".to_string()));
        }
        Ok(pinned.value)
    }
}
