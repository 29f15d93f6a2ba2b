//! Security tests for distributed sessions
//!
//! These tests validate the properties that keep one client from reading or
//! steering another client's session.

#[cfg(test)]
mod tests {
    use super::super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use crate::cookie::{CookieDescriptor, CookieManager, SignedCookieValueManager};
    use crate::testing::{parse_set_cookie, web_context};
    use crate::ticket::{ExpirationPolicy, MemoryTicketRegistry, TicketRegistry, TransientSessionTicketFactory};
    use crate::web::WebContext;
    use http::header::{COOKIE, USER_AGENT};
    use http::{HeaderMap, HeaderValue, Method, Uri};
    use serde_json::json;
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    fn signed_store(registry: &MemoryTicketRegistry, pin_to_client: bool) -> DistributedSessionStore {
        let signer = SignedCookieValueManager::new(vec![7u8; 32]).unwrap().with_client_pinning(pin_to_client);
        DistributedSessionStore::new(
            Arc::new(registry.clone()),
            Arc::new(TransientSessionTicketFactory::default()),
            CookieManager::new(CookieDescriptor::new("DISSESSION")).with_value_manager(Arc::new(signer)),
        )
    }

    fn client_context(cookie: Option<&str>, ip: [u8; 4], user_agent: &str) -> WebContext {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent).unwrap());
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        WebContext::new(Method::GET, Uri::from_static("/cas/login"), headers)
            .with_remote_addr(IpAddr::V4(Ipv4Addr::from(ip)))
    }

    /// Run one request that stores `secret` and return the issued cookie pair
    async fn login(store: &DistributedSessionStore, secret: &str) -> String {
        let mut ctx = client_context(None, [10, 0, 0, 1], "Firefox");
        store.set(&mut ctx, "secret", Some(json!(secret))).await.unwrap();
        let cookie = parse_set_cookie(ctx.set_cookie_headers()[0]);
        format!("{}={}", cookie.name, cookie.value)
    }

    #[test]
    fn test_session_ids_are_unique() {
        let store = DistributedSessionStore::new(
            Arc::new(MemoryTicketRegistry::new()),
            Arc::new(TransientSessionTicketFactory::default()),
            CookieManager::new(CookieDescriptor::new("DISSESSION")),
        );

        let ids: HashSet<String> = (0..1000)
            .map(|_| store.get_or_create_session_id(&mut web_context("/", None)).unwrap())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[tokio::test]
    async fn test_session_isolation() {
        let registry = MemoryTicketRegistry::new();
        let store = signed_store(&registry, false);

        let alice = login(&store, "alice-secret").await;
        let bob = login(&store, "bob-secret").await;
        assert_ne!(alice, bob);

        let mut alice_ctx = client_context(Some(&alice), [10, 0, 0, 1], "Firefox");
        let mut bob_ctx = client_context(Some(&bob), [10, 0, 0, 1], "Firefox");
        assert_eq!(store.get(&mut alice_ctx, "secret").await.unwrap(), Some(json!("alice-secret")));
        assert_eq!(store.get(&mut bob_ctx, "secret").await.unwrap(), Some(json!("bob-secret")));
    }

    #[tokio::test]
    async fn test_forged_session_cookie_gets_fresh_session() {
        let registry = MemoryTicketRegistry::new();
        let store = signed_store(&registry, false);
        let alice = login(&store, "alice-secret").await;

        // The bare session id, without its signature
        let forged = format!("DISSESSION={}", unsigned_session_id(&alice));
        let mut ctx = client_context(Some(&forged), [10, 0, 0, 1], "Firefox");

        assert_eq!(store.get(&mut ctx, "secret").await.unwrap(), None);
        // A new session was minted instead of an error page
        assert_eq!(ctx.set_cookie_headers().len(), 1);
        let (_, alice_value) = alice.split_once('=').unwrap();
        assert_ne!(parse_set_cookie(ctx.set_cookie_headers()[0]).value, alice_value);
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let registry = MemoryTicketRegistry::new();
        let store = signed_store(&registry, false);
        let alice = login(&store, "alice-secret").await;

        let (payload, signature) = alice.split_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", payload, flipped, &signature[1..]);

        let mut ctx = client_context(Some(&tampered), [10, 0, 0, 1], "Firefox");
        assert_eq!(store.get(&mut ctx, "secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pinned_cookie_rejected_from_other_client() {
        let registry = MemoryTicketRegistry::new();
        let store = signed_store(&registry, true);
        let alice = login(&store, "alice-secret").await;

        let mut same_client = client_context(Some(&alice), [10, 0, 0, 1], "Firefox");
        assert_eq!(store.get(&mut same_client, "secret").await.unwrap(), Some(json!("alice-secret")));

        let mut other_ip = client_context(Some(&alice), [192, 168, 1, 9], "Firefox");
        assert_eq!(store.get(&mut other_ip, "secret").await.unwrap(), None);

        let mut other_agent = client_context(Some(&alice), [10, 0, 0, 1], "curl/8.0");
        assert_eq!(store.get(&mut other_agent, "secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_destroyed_session_cannot_be_replayed() {
        let registry = MemoryTicketRegistry::new();
        let store = signed_store(&registry, false);
        let alice = login(&store, "alice-secret").await;

        let mut logout = client_context(Some(&alice), [10, 0, 0, 1], "Firefox");
        assert!(store.destroy_session(&mut logout).await);

        // Replaying the old cookie finds nothing
        let mut replay = client_context(Some(&alice), [10, 0, 0, 1], "Firefox");
        assert_eq!(store.get(&mut replay, "secret").await.unwrap(), None);
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let registry = MemoryTicketRegistry::new();
        let store = DistributedSessionStore::new(
            Arc::new(registry.clone()),
            Arc::new(TransientSessionTicketFactory::new(ExpirationPolicy::Idle { time_to_idle_secs: 0 })),
            CookieManager::new(CookieDescriptor::new("DISSESSION")),
        );

        let mut ctx = web_context("/", Some("DISSESSION=abc123"));
        store.set(&mut ctx, "secret", Some(json!("s3cr3t"))).await.unwrap();

        // Still held by the registry, but never served
        assert_eq!(registry.count().await.unwrap(), 1);
        assert_eq!(store.get(&mut ctx, "secret").await.unwrap(), None);

        assert_eq!(registry.delete_expired().await.unwrap(), 1);
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_session_access() {
        let registry = MemoryTicketRegistry::new();
        let store = Arc::new(signed_store(&registry, false));
        let alice = login(&store, "alice-secret").await;

        let mut handles = vec![];
        for _ in 0..10 {
            let store_clone = store.clone();
            let cookie = alice.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let mut ctx = client_context(Some(&cookie), [10, 0, 0, 1], "Firefox");
                    let value = store_clone.get(&mut ctx, "secret").await.unwrap();
                    assert_eq!(value, Some(json!("alice-secret")));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    /// Session id carried inside a signed, unpinned cookie
    fn unsigned_session_id(cookie: &str) -> String {
        let (_, value) = cookie.split_once('=').unwrap();
        let (payload, _) = value.split_once('.').unwrap();
        String::from_utf8(URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
    }
}
