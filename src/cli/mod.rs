//! # CLI Module
//!
//! This module provides the command-line interface layer for Sporauth,
//! the PKCE authorization client for the Spotify Web API. It implements
//! all user-facing commands and coordinates between the authorization
//! state machine, the persisted session store and the local callback
//! server.
//!
//! ## Overview
//!
//! The CLI is a thin shell over the library: every command builds an
//! [`crate::management::AuthManager`] from the environment-supplied
//! configuration and the file-backed session store, drives one of the
//! four public authorization operations, and persists the store
//! afterwards.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`auth`] - Runs the full interactive OAuth 2.0 PKCE flow: spawns the
//!   local callback listener, opens the authorization URL in the system
//!   browser, waits for the redirect back and completes the code exchange
//!
//! ### Session Queries
//!
//! - [`token`] - Prints the current access token, refreshing it through
//!   the stored refresh token when the persisted entry has expired
//! - [`status`] - Reports the authorization state derived from the
//!   persisted session entries
//!
//! ### Session Teardown
//!
//! - [`logout`] - Expires the persisted token entries; the next `auth`
//!   needs a full authorization
//!
//! ## Data Flow
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Authorization State Machine)
//!     ↓
//! Spotify Layer (Token Endpoint Client)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Error Handling Philosophy
//!
//! Unrecoverable failures terminate the process through the `error!`
//! macro with a message pointing at the next step (usually re-running
//! `sporauth auth`). Recoverable oddities, like an unreadable session
//! cache, produce a warning and continue with an empty session.
//!
//! ## Security Considerations
//!
//! - **OAuth 2.0 PKCE**: No client secret is stored or transmitted
//! - **Local Storage**: Session entries live in the user's local data
//!   directory and expire independently
//! - **Single-Use Codes**: Authorization codes and refresh tokens are
//!   consumed on first use

mod auth;
mod logout;
mod status;
mod token;

pub use auth::auth;
pub use logout::logout;
pub use status::status;
pub use token::token;
