//! Error types for storyline-api.

use thiserror::Error;

/// Terminal outcome of an API request, after any retries.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection-level failure (DNS, refused connection, timeout) that
    /// survived the retry budget.
    #[error("network error for {url} after {attempts} attempt(s): {message}")]
    Network {
        url: String,
        attempts: u32,
        message: String,
    },

    /// Non-success HTTP status. 5xx and 429 are retried before landing here;
    /// other 4xx surface immediately.
    #[error("HTTP {status} from {url} after {attempts} attempt(s)")]
    Http {
        url: String,
        status: u16,
        attempts: u32,
    },

    /// Successful HTTP status with a body that is not the expected JSON.
    /// Deterministic garbage — never retried.
    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
