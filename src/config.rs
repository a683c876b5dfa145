//! Configuration for the Spotify PKCE authorization flow.
//!
//! This module provides the `AuthorizationConfig` value consumed by the
//! authorization state machine, plus the well-known session store keys and
//! TTL windows for persisted entries. Configuration values can be supplied
//! programmatically or loaded from environment variables and a `.env` file
//! in the local data directory.
//!
//! All fallback values (scope list, CSRF state) are merged at construction
//! time; there is no process-wide mutable default state.

use dotenv;
use std::{env, path::PathBuf};

use rand::{Rng, distr::Alphanumeric};

use crate::types::AuthError;

/// Session store key holding the PKCE code verifier.
pub const SESSION_KEY_CODE_VERIFIER: &str = "cv";
/// Session store key holding the current access token.
pub const SESSION_KEY_ACCESS_TOKEN: &str = "at";
/// Session store key holding the current refresh token.
pub const SESSION_KEY_REFRESH_TOKEN: &str = "rt";

/// Safety margin subtracted from the server-reported access token expiry,
/// so an about-to-expire token never gets used.
pub const ACCESS_TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// How long the refresh token entry is kept in the session store.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Lifetime of a code verifier entry. An authorization attempt that has not
/// completed within this window must be restarted from scratch.
pub const CODE_VERIFIER_TTL_SECS: i64 = 60 * 60;

const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

const DEFAULT_SCOPES: [&str; 5] = [
    "user-read-playback-state",
    "streaming",
    "user-read-private",
    "user-modify-playback-state",
    "user-read-email",
];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `sporauth/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/sporauth/.env`
/// - macOS: `~/Library/Application Support/sporauth/.env`
/// - Windows: `%LOCALAPPDATA%/sporauth/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment file is successfully loaded, or an error
/// string if directory creation or file loading fails.
///
/// # Example
///
/// ```
/// use sporauth::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporauth/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// Retrieves the `SERVER_ADDRESS` environment variable which specifies
/// the address and port where the local HTTP server should bind for
/// handling OAuth callbacks during the authentication flow.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8080"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Caller-supplied authorization configuration, immutable for the life of
/// the flow.
///
/// Holds the application credentials and endpoints used by the token
/// endpoint client and the authorization state machine. Optional values
/// fall back at construction time: the scope list falls back to the fixed
/// default list, the CSRF `state` falls back to a random alphanumeric
/// value, and the endpoints fall back to the Spotify accounts service.
///
/// The redirect URI stays optional; when unset, the effective value is
/// derived from the browser environment's current URL at call time.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    client_id: String,
    redirect_uri: Option<String>,
    scopes: Vec<String>,
    state: String,
    auth_url: String,
    token_url: String,
}

impl AuthorizationConfig {
    /// Creates a configuration for the given application client ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredential` when the client ID is empty.
    ///
    /// # Example
    ///
    /// ```
    /// let config = AuthorizationConfig::new("my-client-id")?
    ///     .with_redirect_uri("http://127.0.0.1:8080/callback");
    /// ```
    pub fn new(client_id: impl Into<String>) -> Result<Self, AuthError> {
        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        Ok(Self {
            client_id,
            redirect_uri: None,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            state: generate_state(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        })
    }

    /// Builds a configuration from environment variables.
    ///
    /// Reads the following variables:
    /// - `SPOTIFY_API_AUTH_CLIENT_ID` - required; its absence or emptiness
    ///   is `AuthError::MissingCredential`
    /// - `SPOTIFY_API_REDIRECT_URI` - optional redirect URI
    /// - `SPOTIFY_API_AUTH_SCOPE` - optional space-separated scope list
    /// - `SPOTIFY_API_AUTH_URL` - optional authorization endpoint override
    /// - `SPOTIFY_API_TOKEN_URL` - optional token endpoint override
    ///
    /// Call [`load_env`] beforehand to pick these up from the `.env` file
    /// in the local data directory.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = env::var("SPOTIFY_API_AUTH_CLIENT_ID").unwrap_or_default();
        let mut config = Self::new(client_id)?;

        if let Ok(redirect_uri) = env::var("SPOTIFY_API_REDIRECT_URI") {
            config.redirect_uri = Some(redirect_uri);
        }
        if let Ok(scope) = env::var("SPOTIFY_API_AUTH_SCOPE") {
            config.scopes = scope.split_whitespace().map(|s| s.to_string()).collect();
        }
        if let Ok(auth_url) = env::var("SPOTIFY_API_AUTH_URL") {
            config.auth_url = auth_url;
        }
        if let Ok(token_url) = env::var("SPOTIFY_API_TOKEN_URL") {
            config.token_url = token_url;
        }

        Ok(config)
    }

    /// Sets an explicit redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Replaces the default scope list.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets an explicit CSRF state value instead of the generated one.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Overrides the authorization endpoint.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// The space-joined scope list, as sent in the authorization request.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
