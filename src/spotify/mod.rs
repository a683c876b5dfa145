//! # Spotify Integration Module
//!
//! This module provides the client side of Spotify's accounts service
//! endpoints used by the PKCE authorization flow. It is the only place in
//! the crate that talks to the network, handling the three exchanges the
//! flow needs and normalizing their outcomes into a uniform result.
//!
//! ## Overview
//!
//! The [`auth`] submodule implements the token endpoint client:
//!
//! - **Authorization URL construction** - assembles the query parameters
//!   for the browser redirect, deriving the S256 code challenge from the
//!   persisted verifier
//! - **Code exchange** - trades the callback's authorization code plus the
//!   code verifier for an access/refresh token pair
//! - **Token refresh** - trades a refresh token for a fresh access token
//!
//! ## Design
//!
//! Each operation is a single request/response exchange with no retry
//! logic. Failures surface to the caller, who decides whether to restart
//! the flow:
//!
//! ```text
//! Authorization State Machine (management)
//!          ↓
//! Token Endpoint Client (this module)
//!          ↓
//! HTTP Layer (reqwest, form-urlencoded)
//!          ↓
//! Spotify Accounts Service
//! ```
//!
//! All POST bodies are form-urlencoded, as the token endpoint requires.
//! A `200` response is parsed as the token JSON shape; any other status
//! is reported as a typed failure carrying status code and text, and the
//! body is never parsed as a token.
//!
//! ## PKCE Security
//!
//! The flow never touches a client secret. The code verifier is generated
//! per authorization attempt and the derived challenge binds the eventual
//! code exchange to this client, preventing authorization code
//! interception attacks.
//!
//! ## Dependencies
//!
//! - **reqwest** - HTTP client with JSON support and async capabilities
//! - **serde** - typed deserialization of the token response
//!
//! ## Related Modules
//!
//! - [`crate::management`] - drives these operations from the state machine
//! - [`crate::utils`] - verifier and challenge primitives

pub mod auth;
