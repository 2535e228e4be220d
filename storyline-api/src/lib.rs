//! # storyline-api
//!
//! Blocking HTTP client for the board API with retry, exponential backoff,
//! and progressive per-attempt timeouts.
//!
//! Construct an [`ApiClient`] from a validated
//! [`SyncConfig`](storyline_core::SyncConfig) and call
//! [`ApiClient::board_stories`], [`ApiClient::story`], or
//! [`ApiClient::attachment_bytes`]. Retry behavior is a pure function of
//! `(attempt, failure kind)` — see [`RetryPolicy::decide`].

pub mod client;
pub mod error;
pub mod retry;

pub use client::ApiClient;
pub use error::ApiError;
pub use retry::{Decision, Failure, RetryPolicy};
