//! Test fixtures shared by unit tests

use crate::error::{RegistryError, RegistryResult};
use crate::ticket::{TicketRecord, TicketRegistry};
use crate::web::WebContext;
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue, Method, Uri};
use std::sync::atomic::{AtomicUsize, Ordering};

/// GET request context for `uri`, optionally carrying a `Cookie` header
pub fn web_context(uri: &str, cookie: Option<&str>) -> WebContext {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    WebContext::new(Method::GET, uri.parse::<Uri>().unwrap(), headers)
}

/// A `Set-Cookie` header split into its parts
#[derive(Debug)]
pub struct ParsedSetCookie {
    pub name: String,
    pub value: String,
    pub attributes: Vec<(String, Option<String>)>,
}

impl ParsedSetCookie {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, value)| key.eq_ignore_ascii_case(name) && value.is_none())
    }
}

pub fn parse_set_cookie(header: &str) -> ParsedSetCookie {
    // `Expires` dates contain ", " but never "; "
    let mut parts = header.split("; ");
    let (name, value) = parts.next().and_then(|pair| pair.split_once('=')).unwrap();
    let attributes = parts
        .map(|part| match part.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (part.to_string(), None),
        })
        .collect();

    ParsedSetCookie { name: name.to_string(), value: value.to_string(), attributes }
}

/// Registry whose backend is always down
pub struct FailingRegistry;

fn backend_down() -> RegistryError {
    RegistryError::Backend("connection refused".to_string())
}

#[async_trait::async_trait]
impl TicketRegistry for FailingRegistry {
    async fn add_ticket(&self, _ticket: TicketRecord) -> RegistryResult<()> {
        Err(backend_down())
    }

    async fn update_ticket(&self, _ticket: TicketRecord) -> RegistryResult<()> {
        Err(backend_down())
    }

    async fn get_ticket(&self, _id: &str) -> RegistryResult<Option<TicketRecord>> {
        Err(backend_down())
    }

    async fn delete_ticket(&self, _id: &str) -> RegistryResult<usize> {
        Err(backend_down())
    }

    async fn count(&self) -> RegistryResult<usize> {
        Err(backend_down())
    }
}

/// Wraps a registry and counts the calls made through it
pub struct CountingRegistry<R> {
    inner: R,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<R: TicketRegistry> CountingRegistry<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, reads: AtomicUsize::new(0), writes: AtomicUsize::new(0) }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl<R: TicketRegistry> TicketRegistry for CountingRegistry<R> {
    async fn add_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.add_ticket(ticket).await
    }

    async fn update_ticket(&self, ticket: TicketRecord) -> RegistryResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_ticket(ticket).await
    }

    async fn get_ticket(&self, id: &str) -> RegistryResult<Option<TicketRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_ticket(id).await
    }

    async fn delete_ticket(&self, id: &str) -> RegistryResult<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_ticket(id).await
    }

    async fn count(&self) -> RegistryResult<usize> {
        self.inner.count().await
    }

    async fn delete_expired(&self) -> RegistryResult<usize> {
        self.inner.delete_expired().await
    }
}
