use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Unauthenticated,
    PendingCallback,
    Authenticated,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationState {
    pub phase: AuthPhase,
    pub code: Option<String>,
    pub token: Option<String>,
    pub refresh: Option<String>,
    pub expires_in: u64,
    pub is_authorized: bool,
    pub is_error: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingCredential,
    MissingVerifier,
    TokenExchangeFailed { status: u16, status_text: String },
    TokenRefreshFailed { status: u16, status_text: String },
    NetworkError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => {
                write!(f, "Client ID is missing. Please provide a client_id!")
            }
            AuthError::MissingVerifier => write!(f, "Issues with PKCE code_verifier!"),
            AuthError::TokenExchangeFailed {
                status,
                status_text,
            } => write!(
                f,
                "Invalid response while fetching token: {} {}",
                status, status_text
            ),
            AuthError::TokenRefreshFailed {
                status,
                status_text,
            } => write!(
                f,
                "Invalid response while refreshing token: {} {}",
                status, status_text
            ),
            AuthError::NetworkError(msg) => write!(f, "Network error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
