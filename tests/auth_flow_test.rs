use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Extension, Router,
    extract::Form,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde_json::json;

use sporauth::{
    browser::{BrowserEnvironment, MemoryBrowser},
    config::{
        AuthorizationConfig, SESSION_KEY_ACCESS_TOKEN, SESSION_KEY_CODE_VERIFIER,
        SESSION_KEY_REFRESH_TOKEN,
    },
    management::AuthManager,
    session::{MemorySessionStore, SessionStore},
    spotify::auth::{build_authorization_url, exchange_code_pkce},
    types::{AuthError, AuthPhase},
    utils,
};

const REDIRECT_URI: &str = "http://127.0.0.1:9090/callback";

// Mock token endpoint. Code exchanges answer with token "A"/"R", refresh
// exchanges with the rotated pair "A2"/"R2"; a configured failure status
// answers every request with that status instead.
struct MockTokenEndpoint {
    exchange_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    fail_status: Option<u16>,
    requests: Mutex<Vec<HashMap<String, String>>>,
}

async fn token_handler(
    Extension(endpoint): Extension<Arc<MockTokenEndpoint>>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let grant_type = params.get("grant_type").cloned().unwrap_or_default();
    if grant_type == "refresh_token" {
        endpoint.refresh_calls.fetch_add(1, Ordering::SeqCst);
    } else {
        endpoint.exchange_calls.fetch_add(1, Ordering::SeqCst);
    }
    endpoint.requests.lock().unwrap().push(params);

    if let Some(status) = endpoint.fail_status {
        return (StatusCode::from_u16(status).unwrap(), "denied").into_response();
    }

    let body = if grant_type == "refresh_token" {
        json!({
            "access_token": "A2",
            "refresh_token": "R2",
            "expires_in": 3600,
            "token_type": "Bearer",
            "scope": "streaming"
        })
    } else {
        json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_in": 3600,
            "token_type": "Bearer",
            "scope": "streaming"
        })
    };

    Json(body).into_response()
}

async fn start_token_endpoint(fail_status: Option<u16>) -> (String, Arc<MockTokenEndpoint>) {
    let endpoint = Arc::new(MockTokenEndpoint {
        exchange_calls: AtomicUsize::new(0),
        refresh_calls: AtomicUsize::new(0),
        fail_status,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/token", post(token_handler))
        .layer(Extension(Arc::clone(&endpoint)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/token", addr), endpoint)
}

fn test_config(token_url: &str) -> AuthorizationConfig {
    AuthorizationConfig::new("test-client-id")
        .unwrap()
        .with_redirect_uri(REDIRECT_URI)
        .with_state("test-state")
        .with_token_url(token_url)
}

fn callback_url(code: &str) -> String {
    format!("{}?code={}&state=test-state", REDIRECT_URI, code)
}

fn store_with_verifier() -> MemorySessionStore {
    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_CODE_VERIFIER, "test-verifier", 3600);
    store
}

#[test]
fn test_empty_client_id_is_rejected() {
    let result = AuthorizationConfig::new("");
    assert_eq!(result.unwrap_err(), AuthError::MissingCredential);
}

#[test]
fn test_build_authorization_url_requires_verifier() {
    let config = test_config("http://unused.invalid/token");
    let store = MemorySessionStore::new();

    // No verifier entry in the session store: the flow must be restarted,
    // never silently recovered
    let result = build_authorization_url(&config, REDIRECT_URI, &store);
    assert_eq!(result.unwrap_err(), AuthError::MissingVerifier);
}

#[tokio::test]
async fn test_exchange_code_requires_verifier() {
    let config = test_config("http://unused.invalid/token");
    let store = MemorySessionStore::new();

    // The verifier check fires before any network traffic
    let result = exchange_code_pkce(&config, REDIRECT_URI, "XYZ", &store).await;
    assert_eq!(result.unwrap_err(), AuthError::MissingVerifier);
}

#[test]
fn test_build_authorization_url_contains_required_params() {
    let config = test_config("http://unused.invalid/token");
    let store = store_with_verifier();

    let url = build_authorization_url(&config, REDIRECT_URI, &store).unwrap();

    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(url.contains("client_id=test-client-id"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("code_challenge_method=S256"));
    assert!(url.contains("state=test-state"));

    // The challenge is derived from the stored verifier
    let challenge = utils::generate_code_challenge("test-verifier");
    assert!(url.contains(&format!("code_challenge={}", challenge)));

    // Reserved characters in parameter values are percent-encoded
    assert!(url.contains(&format!("redirect_uri={}", utils::urlencode(REDIRECT_URI))));

    // The default scope list rides along space-joined
    assert!(url.contains("scope=user-read-playback-state%20streaming"));
}

#[tokio::test]
async fn test_init_generates_verifier_when_unauthenticated() {
    let config = test_config("http://unused.invalid/token");
    let browser = MemoryBrowser::with_url(REDIRECT_URI);

    let mut manager = AuthManager::new(config, MemorySessionStore::new(), browser);
    manager.init().await;

    // A fresh verifier is persisted, ready for login()
    assert!(manager.store().get(SESSION_KEY_CODE_VERIFIER).is_some());
    assert_eq!(manager.state().phase, AuthPhase::Unauthenticated);
    assert!(!manager.state().is_authorized);
}

#[tokio::test]
async fn test_round_trip_exchange_then_cached_token() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);
    let browser = MemoryBrowser::with_url(callback_url("XYZ"));

    let mut manager = AuthManager::new(config, store_with_verifier(), browser);
    manager.init().await;

    // The exchange ran exactly once and established the session
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 1);
    assert!(manager.state().is_authorized);
    assert_eq!(manager.state().phase, AuthPhase::Authenticated);
    assert_eq!(manager.state().token.as_deref(), Some("A"));
    assert_eq!(manager.state().refresh.as_deref(), Some("R"));
    assert_eq!(manager.state().expires_in, 3600);

    // The exchanged code is gone and the visible URL was stripped
    assert!(manager.state().code.is_none());
    assert_eq!(manager.browser().current_url(), REDIRECT_URI);

    // The request carried the PKCE verifier
    let requests = endpoint.requests.lock().unwrap();
    assert_eq!(
        requests[0].get("code_verifier").map(String::as_str),
        Some("test-verifier")
    );
    assert_eq!(requests[0].get("code").map(String::as_str), Some("XYZ"));
    drop(requests);

    // getToken is a cache hit: same token, zero extra network calls
    let token = manager.get_token().await.unwrap();
    assert_eq!(token.as_deref(), Some("A"));
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 1);
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_code_has_priority_over_stored_tokens() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);
    let browser = MemoryBrowser::with_url(callback_url("XYZ"));

    // The store already holds a usable-looking session
    let mut store = store_with_verifier();
    store.set(SESSION_KEY_ACCESS_TOKEN, "STORED", 3600);
    store.set(SESSION_KEY_REFRESH_TOKEN, "STORED-R", 3600);

    let mut manager = AuthManager::new(config, store, browser);
    manager.init().await;

    // The callback code wins: an exchange was attempted, not skipped
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state().token.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_exchange_failure_surfaces_error_state() {
    let (token_url, endpoint) = start_token_endpoint(Some(401)).await;
    let config = test_config(&token_url);
    let browser = MemoryBrowser::with_url(callback_url("XYZ"));

    let mut manager = AuthManager::new(config, store_with_verifier(), browser);
    manager.init().await;

    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 1);

    // Failure is observed through state, not through a panic or retry
    assert!(manager.state().is_error);
    assert!(manager.state().error.contains("401"));
    assert!(!manager.state().is_authorized);
    assert_eq!(manager.state().phase, AuthPhase::Error);

    // No token was persisted
    assert_eq!(manager.store().get(SESSION_KEY_ACCESS_TOKEN), None);
    assert_eq!(manager.store().get(SESSION_KEY_REFRESH_TOKEN), None);
}

#[tokio::test]
async fn test_state_mismatch_is_rejected_without_exchange() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);
    let url = format!("{}?code=XYZ&state=evil", REDIRECT_URI);
    let browser = MemoryBrowser::with_url(url);

    let mut manager = AuthManager::new(config, store_with_verifier(), browser);
    manager.init().await;

    // No exchange for a callback we did not initiate
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 0);
    assert!(manager.state().is_error);
    assert!(manager.state().code.is_none());
    assert!(!manager.state().is_authorized);
}

#[tokio::test]
async fn test_denied_callback_is_terminal() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);
    let url = format!("{}?error=access_denied&state=test-state", REDIRECT_URI);
    let browser = MemoryBrowser::with_url(url);

    let mut manager = AuthManager::new(config, store_with_verifier(), browser);
    manager.init().await;

    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 0);
    assert!(manager.state().is_error);
    assert!(manager.state().error.contains("access_denied"));

    // The response parameters were stripped from the visible URL
    assert_eq!(manager.browser().current_url(), REDIRECT_URI);
}

#[tokio::test]
async fn test_login_with_both_tokens_is_immediate() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);

    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_ACCESS_TOKEN, "STORED", 3600);
    store.set(SESSION_KEY_REFRESH_TOKEN, "STORED-R", 3600);

    let mut manager = AuthManager::new(config, store, MemoryBrowser::with_url(REDIRECT_URI));
    let authorized = manager.login().await.unwrap();

    // Both entries present: authenticated with zero network calls
    assert!(authorized);
    assert!(manager.state().is_authorized);
    assert_eq!(manager.state().token.as_deref(), Some("STORED"));
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 0);
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_with_refresh_only_performs_refresh() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);

    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_REFRESH_TOKEN, "OLD-R", 3600);

    let mut manager = AuthManager::new(config, store, MemoryBrowser::with_url(REDIRECT_URI));
    let authorized = manager.login().await.unwrap();

    assert!(authorized);
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state().token.as_deref(), Some("A2"));

    // The rotated pair is what got persisted; the old single-use refresh
    // token is gone
    assert_eq!(
        manager.store().get(SESSION_KEY_ACCESS_TOKEN).as_deref(),
        Some("A2")
    );
    assert_eq!(
        manager.store().get(SESSION_KEY_REFRESH_TOKEN).as_deref(),
        Some("R2")
    );
}

#[tokio::test]
async fn test_login_unauthenticated_redirects_to_authorization() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);

    let mut manager = AuthManager::new(
        config,
        store_with_verifier(),
        MemoryBrowser::with_url(REDIRECT_URI),
    );
    let authorized = manager.login().await.unwrap();

    // Resolves false; the redirect is a fire-and-forget side effect
    assert!(!authorized);
    assert_eq!(endpoint.exchange_calls.load(Ordering::SeqCst), 0);

    let navigations = manager.browser().navigations();
    assert_eq!(navigations.len(), 1);
    assert!(navigations[0].starts_with("https://accounts.spotify.com/authorize?"));
    assert!(navigations[0].contains("client_id=test-client-id"));
}

#[tokio::test]
async fn test_login_without_verifier_raises_missing_verifier() {
    let config = test_config("http://unused.invalid/token");

    let mut manager = AuthManager::new(
        config,
        MemorySessionStore::new(),
        MemoryBrowser::with_url(REDIRECT_URI),
    );

    // Building the authorization URL needs a verifier; unlike exchange
    // failures this surfaces to the caller directly
    let result = manager.login().await;
    assert_eq!(result.unwrap_err(), AuthError::MissingVerifier);
}

#[tokio::test]
async fn test_expired_token_triggers_single_refresh() {
    let (token_url, endpoint) = start_token_endpoint(None).await;
    let config = test_config(&token_url);

    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_ACCESS_TOKEN, "OLD", 300);
    store.set(SESSION_KEY_REFRESH_TOKEN, "OLD-R", 3600);

    let mut manager = AuthManager::new(config, store, MemoryBrowser::with_url(REDIRECT_URI));
    assert!(manager.login().await.unwrap());

    // Simulate the access entry lapsing while the refresh entry survives
    manager.store_mut().advance_clock(301);

    let token = manager.get_token().await.unwrap();
    assert_eq!(token.as_deref(), Some("A2"));
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 1);

    // The renewed token is now the cached one; no further network calls
    let token = manager.get_token().await.unwrap();
    assert_eq!(token.as_deref(), Some("A2"));
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_failure_yields_no_token() {
    let (token_url, endpoint) = start_token_endpoint(Some(401)).await;
    let config = test_config(&token_url);

    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_ACCESS_TOKEN, "OLD", 300);
    store.set(SESSION_KEY_REFRESH_TOKEN, "OLD-R", 3600);

    let mut manager = AuthManager::new(config, store, MemoryBrowser::with_url(REDIRECT_URI));
    assert!(manager.login().await.unwrap());

    manager.store_mut().advance_clock(301);

    let token = manager.get_token().await.unwrap();
    assert_eq!(token, None);
    assert_eq!(endpoint.refresh_calls.load(Ordering::SeqCst), 1);

    // The failure transitioned the state machine
    assert!(manager.state().is_error);
    assert!(manager.state().error.contains("refreshing"));
    assert!(!manager.state().is_authorized);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let config = test_config("http://unused.invalid/token");

    let mut store = MemorySessionStore::new();
    store.set(SESSION_KEY_ACCESS_TOKEN, "STORED", 3600);
    store.set(SESSION_KEY_REFRESH_TOKEN, "STORED-R", 3600);

    let mut manager = AuthManager::new(config, store, MemoryBrowser::with_url(REDIRECT_URI));
    assert!(manager.login().await.unwrap());

    manager.logout();

    // Session entries expired, in-memory state reset
    assert_eq!(manager.store().get(SESSION_KEY_ACCESS_TOKEN), None);
    assert_eq!(manager.store().get(SESSION_KEY_REFRESH_TOKEN), None);
    assert!(!manager.state().is_authorized);
    assert!(manager.state().token.is_none());
    assert!(manager.state().refresh.is_none());
    assert!(!manager.state().is_error);
    assert_eq!(manager.state().phase, AuthPhase::Unauthenticated);

    // A second logout leaves the exact same picture
    manager.logout();
    assert_eq!(manager.store().get(SESSION_KEY_ACCESS_TOKEN), None);
    assert_eq!(manager.store().get(SESSION_KEY_REFRESH_TOKEN), None);
    assert!(!manager.state().is_authorized);
    assert!(manager.state().token.is_none());
    assert!(manager.state().refresh.is_none());
}

#[tokio::test]
async fn test_get_token_unauthenticated_redirects() {
    let config = test_config("http://unused.invalid/token");

    let mut manager = AuthManager::new(
        config,
        store_with_verifier(),
        MemoryBrowser::with_url(REDIRECT_URI),
    );

    let token = manager.get_token().await.unwrap();
    assert_eq!(token, None);

    // Same side effect as an unauthenticated login
    let navigations = manager.browser().navigations();
    assert_eq!(navigations.len(), 1);
    assert!(navigations[0].starts_with("https://accounts.spotify.com/authorize?"));
}
