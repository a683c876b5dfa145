use crate::{
    browser::BrowserEnvironment,
    config::{
        ACCESS_TOKEN_EXPIRY_MARGIN_SECS, AuthorizationConfig, CODE_VERIFIER_TTL_SECS,
        REFRESH_TOKEN_TTL_SECS, SESSION_KEY_ACCESS_TOKEN, SESSION_KEY_CODE_VERIFIER,
        SESSION_KEY_REFRESH_TOKEN,
    },
    session::SessionStore,
    spotify,
    types::{AuthError, AuthPhase, AuthorizationState, TokenResponse},
    utils, warning,
};

/// The authorization state machine.
///
/// Owns one `AuthorizationConfig` and one `AuthorizationState` for the
/// life of the application session, orchestrating verifier generation,
/// the token endpoint client, the session store and the browser
/// environment. State only changes through the four public operations
/// (`init`, `login`, `logout`, `get_token`); callers read it through
/// [`state`](AuthManager::state).
///
/// All operations take `&mut self`, so overlapping refresh exchanges
/// through one manager cannot be expressed.
pub struct AuthManager<S, B> {
    config: AuthorizationConfig,
    state: AuthorizationState,
    store: S,
    browser: B,
}

impl<S: SessionStore, B: BrowserEnvironment> AuthManager<S, B> {
    pub fn new(config: AuthorizationConfig, store: S, browser: B) -> Self {
        AuthManager {
            config,
            state: AuthorizationState::default(),
            store,
            browser,
        }
    }

    pub fn state(&self) -> &AuthorizationState {
        &self.state
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Initializes the flow from the current browser URL.
    ///
    /// Checks are mutually exclusive and run in fixed priority order:
    /// a callback `code` parameter wins over everything, the absence of
    /// any code/token/refresh state triggers generation of a fresh code
    /// verifier, and otherwise the call is an idempotent no-op. The
    /// priority order prevents re-generating the verifier while a code
    /// exchange is pending.
    ///
    /// A callback carrying a `state` value other than the one sent, or an
    /// `error` value (user denial), transitions to the error state without
    /// attempting an exchange.
    pub async fn init(&mut self) {
        let current = self.browser.current_url();
        let query = utils::parse_query(&current);

        if let Some(denial) = query.get("error") {
            self.browser.replace_history(&utils::strip_query(&current));
            self.fail(format!("Authorization denied: {}", denial));
            return;
        }

        if let Some(code) = query.get("code") {
            if query.get("state").map(String::as_str) != Some(self.config.state()) {
                self.browser.replace_history(&utils::strip_query(&current));
                self.fail("State mismatch in authorization callback!".to_string());
                return;
            }

            self.state.code = Some(code.clone());
            self.state.phase = AuthPhase::PendingCallback;
            // Remove the authorization response parameters from the
            // visible URL before exchanging the code.
            self.browser.replace_history(&utils::strip_query(&current));
            self.request_token().await;
        } else if self.state.code.is_none()
            && self.state.token.is_none()
            && self.state.refresh.is_none()
        {
            let verifier = utils::generate_code_verifier();
            self.store
                .set(SESSION_KEY_CODE_VERIFIER, &verifier, CODE_VERIFIER_TTL_SECS);
        }
    }

    /// Logs the user in from persisted session state.
    ///
    /// With both tokens persisted the manager marks itself authenticated
    /// without any network call. With only a refresh token it attempts a
    /// refresh exchange and returns the resulting authorization status.
    /// With neither, it returns `false` after navigating the browser to
    /// the authorization URL; the navigation is fire-and-forget, so
    /// callers must not rely on code running after it in a real browser
    /// environment.
    pub async fn login(&mut self) -> Result<bool, AuthError> {
        let token = self.store.get(SESSION_KEY_ACCESS_TOKEN);
        let refresh = self.store.get(SESSION_KEY_REFRESH_TOKEN);

        match (token, refresh) {
            (Some(token), Some(refresh)) => {
                self.state.token = Some(token);
                self.state.refresh = Some(refresh);
                self.state.is_authorized = true;
                self.state.is_error = false;
                self.state.error.clear();
                self.state.phase = AuthPhase::Authenticated;
                Ok(true)
            }
            (None, Some(refresh)) => {
                self.state.refresh = Some(refresh);
                self.refresh_token().await;
                Ok(self.state.is_authorized)
            }
            _ => {
                self.redirect_to_auth()?;
                Ok(false)
            }
        }
    }

    /// Logs the current user out.
    ///
    /// Expires the persisted access and refresh token entries and resets
    /// the in-memory state to unauthenticated. A full authorization is
    /// needed the next time. Calling this twice is the same as calling
    /// it once.
    pub fn logout(&mut self) {
        self.store.set(SESSION_KEY_ACCESS_TOKEN, "", 0);
        self.store.set(SESSION_KEY_REFRESH_TOKEN, "", 0);

        self.state.code = None;
        self.state.token = None;
        self.state.refresh = None;
        self.state.expires_in = 0;
        self.state.is_authorized = false;
        self.state.is_error = false;
        self.state.error.clear();
        self.state.phase = AuthPhase::Unauthenticated;
    }

    /// Returns the current access token, refreshing it if it has expired.
    ///
    /// When the in-memory token still matches the persisted one this is a
    /// cache hit with zero network calls. When the persisted entry has
    /// expired or rotated and a refresh token is available, exactly one
    /// refresh exchange runs; `None` comes back on refresh failure, with
    /// the state reflecting the failure. When not authenticated at all,
    /// the browser is navigated to the authorization URL and `None` is
    /// returned.
    pub async fn get_token(&mut self) -> Result<Option<String>, AuthError> {
        if self.state.is_authorized {
            if let Some(token) = self.state.token.clone() {
                if self.store.get(SESSION_KEY_ACCESS_TOKEN).as_deref() == Some(token.as_str()) {
                    return Ok(Some(token));
                }
            }

            if self.state.refresh.is_some() {
                self.refresh_token().await;
                if self.state.is_authorized {
                    return Ok(self.state.token.clone());
                }
                return Ok(None);
            }

            warning!("Missing refresh_token. Out of sync.");
            return Ok(None);
        }

        self.redirect_to_auth()?;
        Ok(None)
    }

    fn effective_redirect_uri(&self) -> String {
        match self.config.redirect_uri() {
            Some(uri) => uri.to_string(),
            None => utils::strip_query(&self.browser.current_url()),
        }
    }

    fn redirect_to_auth(&mut self) -> Result<(), AuthError> {
        let redirect_uri = self.effective_redirect_uri();
        let url = spotify::auth::build_authorization_url(&self.config, &redirect_uri, &self.store)?;
        self.browser.navigate(&url);
        Ok(())
    }

    async fn request_token(&mut self) {
        let Some(code) = self.state.code.clone() else {
            return;
        };

        let redirect_uri = self.effective_redirect_uri();
        match spotify::auth::exchange_code_pkce(&self.config, &redirect_uri, &code, &self.store)
            .await
        {
            Ok(response) => {
                // The authorization code is single use; drop it now that
                // it has been exchanged.
                self.state.code = None;
                self.save_tokens(response);
            }
            Err(e) => {
                warning!("Issues while requesting token: {}", e);
                self.fail(e.to_string());
            }
        }
    }

    async fn refresh_token(&mut self) {
        let Some(refresh) = self.state.refresh.clone() else {
            self.fail("Missing refresh_token. Out of sync.".to_string());
            return;
        };

        match spotify::auth::refresh_access_token(&self.config, &refresh).await {
            Ok(response) => self.save_tokens(response),
            Err(e) => {
                warning!("Issues while refreshing token: {}", e);
                self.fail(e.to_string());
            }
        }
    }

    fn save_tokens(&mut self, response: TokenResponse) {
        // Tokens are persisted only as a pair. The access entry expires a
        // minute before the server-reported expiry so an invalid token
        // never gets used; the refresh entry keeps its long-lived window.
        self.store.set(
            SESSION_KEY_ACCESS_TOKEN,
            &response.access_token,
            response.expires_in as i64 - ACCESS_TOKEN_EXPIRY_MARGIN_SECS,
        );
        self.store.set(
            SESSION_KEY_REFRESH_TOKEN,
            &response.refresh_token,
            REFRESH_TOKEN_TTL_SECS,
        );

        self.state.token = Some(response.access_token);
        self.state.refresh = Some(response.refresh_token);
        self.state.expires_in = response.expires_in;
        self.state.is_authorized = true;
        self.state.is_error = false;
        self.state.error.clear();
        self.state.phase = AuthPhase::Authenticated;
    }

    fn fail(&mut self, message: String) {
        self.state.is_error = true;
        self.state.error = message;
        self.state.is_authorized = false;
        self.state.phase = AuthPhase::Error;
    }
}
