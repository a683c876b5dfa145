use reqwest::Client;

use crate::{
    config::{AuthorizationConfig, SESSION_KEY_CODE_VERIFIER},
    session::SessionStore,
    types::{AuthError, TokenResponse},
    utils,
};

/// Constructs the full authorization URL for the PKCE flow.
///
/// Looks up the code verifier persisted by the state machine, derives the
/// S256 challenge from it and assembles the query parameters Spotify
/// expects on its authorization endpoint:
/// `client_id`, `response_type=code`, `redirect_uri`,
/// `code_challenge_method=S256`, `code_challenge`, `state` and the
/// space-joined `scope` list.
///
/// # Arguments
///
/// * `config` - Authorization configuration holding client ID, CSRF state
///   and scope list
/// * `redirect_uri` - The resolved redirect URI for this flow
/// * `store` - Session store holding the persisted code verifier
///
/// # Errors
///
/// Returns `AuthError::MissingVerifier` when no code verifier is present
/// in the session store. A missing verifier means the flow was never
/// initiated (or its entry expired) and must be restarted; it is never
/// silently recovered here.
///
/// # Example
///
/// ```
/// let url = build_authorization_url(&config, "http://127.0.0.1:8080/callback", &store)?;
/// // Navigate the user to `url` to request authorization.
/// ```
pub fn build_authorization_url(
    config: &AuthorizationConfig,
    redirect_uri: &str,
    store: &impl SessionStore,
) -> Result<String, AuthError> {
    let verifier = store
        .get(SESSION_KEY_CODE_VERIFIER)
        .ok_or(AuthError::MissingVerifier)?;
    let code_challenge = utils::generate_code_challenge(&verifier);

    Ok(format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge_method=S256&code_challenge={code_challenge}&state={state}&scope={scope}",
        auth_url = config.auth_url(),
        client_id = utils::urlencode(config.client_id()),
        redirect_uri = utils::urlencode(redirect_uri),
        code_challenge = code_challenge,
        state = utils::urlencode(config.state()),
        scope = utils::urlencode(&config.scope_param()),
    ))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Completes the OAuth 2.0 PKCE flow by exchanging the authorization code
/// received from the callback for an access token. The code verifier from
/// the session store proves that the same client that initiated the auth
/// flow is completing it.
///
/// Submits a single form-encoded POST to the token endpoint with
/// `{client_id, grant_type=authorization_code, code, redirect_uri,
/// code_verifier}`. There is no retry logic; the caller decides whether
/// to restart the flow on failure.
///
/// # Arguments
///
/// * `config` - Authorization configuration
/// * `redirect_uri` - Must match the redirect URI sent in the
///   authorization request
/// * `code` - Authorization code received from the OAuth callback
/// * `store` - Session store holding the persisted code verifier
///
/// # Returns
///
/// A `TokenResponse` with access token, refresh token, expiry and scope
/// on a `200` response.
///
/// # Errors
///
/// - `AuthError::MissingVerifier` - no code verifier in the session store
/// - `AuthError::TokenExchangeFailed` - any non-200 response, carrying
///   status code and status text; the body is not parsed as a token
/// - `AuthError::NetworkError` - transport-level failure
pub async fn exchange_code_pkce(
    config: &AuthorizationConfig,
    redirect_uri: &str,
    code: &str,
    store: &impl SessionStore,
) -> Result<TokenResponse, AuthError> {
    let verifier = store
        .get(SESSION_KEY_CODE_VERIFIER)
        .ok_or(AuthError::MissingVerifier)?;

    let client = Client::new();
    let res = client
        .post(config.token_url())
        .form(&[
            ("client_id", config.client_id()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", &verifier),
        ])
        .send()
        .await
        .map_err(|e| AuthError::NetworkError(e.to_string()))?;

    let status = res.status();
    if status != reqwest::StatusCode::OK {
        return Err(AuthError::TokenExchangeFailed {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    res.json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::NetworkError(e.to_string()))
}

/// Refreshes an expired access token using a refresh token.
///
/// Exchanges a refresh token for a new access token so authenticated
/// access continues without user interaction. A refresh token obtained
/// through PKCE is valid for one exchange; the response carries the
/// replacement, and the caller must persist the newest value.
///
/// # Errors
///
/// - `AuthError::TokenRefreshFailed` - any non-200 response
/// - `AuthError::NetworkError` - transport-level failure
pub async fn refresh_access_token(
    config: &AuthorizationConfig,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let client = Client::new();
    let res = client
        .post(config.token_url())
        .form(&[
            ("client_id", config.client_id()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| AuthError::NetworkError(e.to_string()))?;

    let status = res.status();
    if status != reqwest::StatusCode::OK {
        return Err(AuthError::TokenRefreshFailed {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    res.json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::NetworkError(e.to_string()))
}
