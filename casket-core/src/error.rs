//! Error types shared across the cookie, ticket and session layers

/// Failures of a cookie value transform.
///
/// Decode failures never reach session callers: the cookie manager turns
/// them into "no cookie".
#[derive(thiserror::Error, Debug)]
pub enum CookieValueError {
    #[error("Malformed cookie value: {0}")]
    Malformed(String),
    #[error("Cookie value signature does not match")]
    SignatureMismatch,
    #[error("Cookie value was issued to a different client: {0}")]
    ClientMismatch(String),
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Failures while writing a cookie to the response.
#[derive(thiserror::Error, Debug)]
pub enum CookieError {
    #[error("Invalid Set-Cookie header for cookie '{name}': {source}")]
    InvalidHeader {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("Value for cookie '{name}' contains characters outside the cookie-octet set")]
    InvalidValue { name: String },
    #[error("Failed to encode value for cookie '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: CookieValueError,
    },
}

/// Ticket registry result type
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Ticket registry error type
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("Ticket {id} has kind '{found}', expected '{expected}'")]
    KindMismatch { id: String, expected: String, found: String },
    #[error("Registry backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Errors surfaced by session attribute operations.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Cookie(#[from] CookieError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_wraps_registry_error() {
        let err: SessionError = RegistryError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, SessionError::Registry(RegistryError::Backend(_))));
        assert_eq!(err.to_string(), "Registry backend error: connection reset");
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = RegistryError::KindMismatch {
            id: "TGT-1".to_string(),
            expected: "TST".to_string(),
            found: "TGT".to_string(),
        };
        assert_eq!(err.to_string(), "Ticket TGT-1 has kind 'TGT', expected 'TST'");
    }
}
