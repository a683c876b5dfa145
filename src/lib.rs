//! Spotify PKCE Authorization Library
//!
//! This library implements the client side of the OAuth 2.0 Authorization
//! Code flow with PKCE against the Spotify accounts service. It owns the
//! full authorization lifecycle: verifier/challenge generation, the
//! authorization redirect, the redirect-back callback, code-for-token
//! exchange, token refresh and token persistence.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local callback server
//! - `browser` - Injectable browser environment (navigate, current URL)
//! - `cli` - Command-line interface implementations
//! - `config` - Authorization configuration and environment variables
//! - `management` - The authorization state machine
//! - `server` - Local HTTP server for OAuth callbacks
//! - `session` - Persisted key/value session store with TTL semantics
//! - `spotify` - Spotify token endpoint client
//! - `types` - Data structures and type definitions
//! - `utils` - Verifier, challenge and URL helpers
//!
//! # Example
//!
//! ```
//! use sporauth::{config::AuthorizationConfig, management::AuthManager};
//! use sporauth::{browser::MemoryBrowser, session::MemorySessionStore};
//!
//! #[tokio::main]
//! async fn main() -> sporauth::Res<()> {
//!     let config = AuthorizationConfig::new("my-client-id")?;
//!     let mut auth = AuthManager::new(config, MemorySessionStore::new(), MemoryBrowser::new());
//!     auth.init().await;
//!     let authorized = auth.login().await?;
//!     println!("authorized: {}", authorized);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod browser;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use sporauth::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Waiting for authorization callback...");
/// info!("Token expires in {} seconds", expires_in);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// in the CLI layer; library code propagates errors through `Result` and
/// the authorization state instead.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues that don't require program termination.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, navigate manually: {}", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
