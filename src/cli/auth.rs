use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    browser::SystemBrowser,
    config::AuthorizationConfig,
    error, info,
    management::AuthManager,
    server::start_callback_server,
    session::FileSessionStore,
    success, warning,
};

/// Runs the complete OAuth 2.0 PKCE authentication flow against Spotify.
///
/// This function orchestrates the entire authentication process:
/// 1. Starting the local callback server
/// 2. Generating the PKCE code verifier through the state machine
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the OAuth callback
/// 5. Feeding the callback back through the state machine for the
///    code-for-token exchange
/// 6. Persisting the session for future use
///
/// When the persisted session already holds a usable token or refresh
/// token, the flow short-circuits without opening a browser.
///
/// # Error Handling
///
/// - Browser launch failures produce a warning with manual URL instructions
/// - Session persistence failures terminate the program with an error
/// - Authentication timeouts or failures terminate with an error message
pub async fn auth() {
    let config = match AuthorizationConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };
    let Some(redirect_uri) = config.redirect_uri().map(str::to_string) else {
        error!("SPOTIFY_API_REDIRECT_URI must be set for the local callback flow.");
    };

    // start callback server
    let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let server_state = Arc::clone(&captured);
    tokio::spawn(async move {
        start_callback_server(server_state).await;
    });

    let mut store = FileSessionStore::new();
    if let Err(e) = store.load().await {
        warning!("Could not read session cache: {}", e);
    }

    let mut manager = AuthManager::new(config, store, SystemBrowser::new());
    manager.init().await;

    match manager.login().await {
        Ok(true) => {
            if let Err(e) = manager.store().persist().await {
                error!("Failed to save session cache: {}", e);
            }
            success!("Authentication successful!");
            return;
        }
        Ok(false) => {
            if manager.state().is_error {
                error!(
                    "Authentication failed: {}\nRun sporauth logout and try again.",
                    manager.state().error
                );
            }
            // The browser is on its way to the authorization URL now.
        }
        Err(e) => error!("{}", e),
    }

    info!("Waiting for authorization in the browser...");
    let Some(query) = wait_for_callback(captured).await else {
        error!("Authentication failed or timed out.");
    };

    // Feed the redirect-back URL into the state machine; init spots the
    // pending callback and performs the exchange.
    manager
        .browser_mut()
        .set_current_url(format!("{}?{}", redirect_uri, query));
    manager.init().await;

    if manager.state().is_authorized {
        if let Err(e) = manager.store().persist().await {
            error!("Failed to save session cache: {}", e);
        }
        success!("Authentication successful!");
    } else {
        error!("Authentication failed: {}", manager.state().error);
    }
}

/// Waits for the OAuth callback to be captured by the local server.
///
/// Polls the shared capture slot with a 60-second timeout. This runs
/// concurrently with the callback handler that stores the redirect
/// query after the user authorizes in the browser.
///
/// Returns `Some(query)` with the raw callback query string, or `None`
/// if the timeout is reached without a callback.
async fn wait_for_callback(captured: Arc<Mutex<Option<String>>>) -> Option<String> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let capture = captured.lock().await;
        if let Some(query) = capture.as_ref() {
            return Some(query.clone());
        }
        drop(capture);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
