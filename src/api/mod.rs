//! # API Module
//!
//! This module provides the HTTP endpoints served by the local callback
//! listener during the OAuth authorization flow.
//!
//! ## Overview
//!
//! A native process has no `window.location` for the authorization server
//! to redirect back to, so the CLI runs a short-lived local HTTP server
//! while an authorization attempt is in flight. The endpoints here handle:
//!
//! - **OAuth Callback Capture**: Receives the authorization server's
//!   redirect-back request and hands its query parameters to the waiting
//!   authorization flow
//! - **Health Monitoring**: Reports application status and version for
//!   quick liveness checks
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`callback`] - Captures the `code`/`state` (or `error`) parameters
//!   from the redirect-back request. The handler deliberately does not
//!   exchange the code itself; the authorization state machine owns the
//!   exchange, so the handler only records the raw query and renders a
//!   minimal close-this-window page.
//!
//! ### Monitoring
//!
//! - [`health`] - Returns application status and version information.
//!
//! ## Architecture
//!
//! The module is built using the [Axum](https://docs.rs/axum) web framework.
//! Each endpoint is an async function that plugs into Axum's routing
//! system; shared state travels through an `Extension` layer.
//!
//! ## Related Modules
//!
//! - [`crate::server`] - binds the router to the configured address
//! - [`crate::management`] - consumes the captured callback parameters

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
