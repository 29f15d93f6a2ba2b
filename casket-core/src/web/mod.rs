//! Per-request web exchange
//!
//! [`WebContext`] holds the parts of an inbound request that session tracking
//! reads (headers, query parameters, client address), a small map of request
//! attributes that lives exactly as long as the request, and the `Set-Cookie`
//! headers produced while handling it.
//!
//! A context is created per request and dropped at the end of it. Nothing in
//! it is shared between requests.

use crate::error::CookieError;
use http::header::{COOKIE, SET_COOKIE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, Request, Response, Uri};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request/response pair for a single exchange
#[derive(Debug, Clone)]
pub struct WebContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote_addr: Option<IpAddr>,
    parameters: HashMap<String, String>,
    attributes: HashMap<String, String>,
    response_headers: HeaderMap,
}

impl WebContext {
    /// Build a context from an inbound request. The body is never read.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.method().clone(), request.uri().clone(), request.headers().clone())
    }

    /// Build a context from request parts
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        let parameters = uri.query().map(parse_query).unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            remote_addr: None,
            parameters,
            attributes: HashMap::new(),
            response_headers: HeaderMap::new(),
        }
    }

    /// Record the peer address of the connection
    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn remote_addr(&self) -> Option<IpAddr> {
        self.remote_addr
    }

    /// First value of a request header, if it is valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT.as_str())
    }

    /// Request parameter by name (query string, or set by the caller)
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Add a parameter decoded from somewhere other than the query string,
    /// such as a form body. Existing values are replaced.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Raw value of the first cookie named `name` across all `Cookie` headers
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| find_cookie(header, name))
    }

    pub fn request_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_request_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_request_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Queue a `Set-Cookie` header on the response
    pub fn add_set_cookie(&mut self, cookie_name: &str, header: String) -> Result<(), CookieError> {
        let value = HeaderValue::from_str(&header).map_err(|source| CookieError::InvalidHeader {
            name: cookie_name.to_string(),
            source,
        })?;
        self.response_headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// All `Set-Cookie` headers queued so far, in order
    pub fn set_cookie_headers(&self) -> Vec<&str> {
        self.response_headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Copy the queued response headers onto an outgoing response
    pub fn apply_to<B>(&self, response: &mut Response<B>) {
        for (name, value) in self.response_headers.iter() {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
}

fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}

/// Parse a query string; the first occurrence of a name wins
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
            log::debug!("Skipping undecodable query parameter [{}]", pair);
            continue;
        };
        parameters.entry(key).or_insert(value);
    }
    parameters
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " ")).ok().map(|s| s.into_owned())
}
