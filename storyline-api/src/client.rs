//! Blocking board API client.
//!
//! Every request carries the bearer token and a JSON accept header; failed
//! attempts are classified by [`RetryPolicy::decide`] and retried with a
//! blocking backoff sleep. Each attempt and each retry decision is logged.

use std::io::Read;

use serde::de::DeserializeOwned;

use storyline_core::{RemoteAttachment, RemoteStory, StoryId, StoryStub, SyncConfig};

use crate::error::ApiError;
use crate::retry::{Decision, Failure, RetryPolicy};

const USER_AGENT: &str = concat!("storyline/", env!("CARGO_PKG_VERSION"));

/// Cap on attachment payloads we are willing to buffer (10 MiB).
const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

pub struct ApiClient {
    agent: ureq::Agent,
    config: SyncConfig,
    policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_policy(config, RetryPolicy::default())
    }

    pub fn with_policy(config: &SyncConfig, policy: RetryPolicy) -> Self {
        let agent = ureq::AgentBuilder::new().redirects(3).build();
        Self {
            agent,
            config: config.clone(),
            policy,
        }
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// `GET /api/v1/boards/{board}/stories` — board-level story stubs.
    pub fn board_stories(&self) -> Result<Vec<StoryStub>, ApiError> {
        let url = format!(
            "{}/boards/{}/stories",
            self.config.api_url(),
            self.config.board_name
        );
        self.get_json(&url)
    }

    /// `GET /api/v1/stories/{id}` — full story detail.
    pub fn story(&self, id: &StoryId) -> Result<RemoteStory, ApiError> {
        let url = format!("{}/stories/{}", self.config.api_url(), id);
        self.get_json(&url)
    }

    /// Fetch an attachment's binary content from its board-relative URL.
    pub fn attachment_bytes(&self, attachment: &RemoteAttachment) -> Result<Vec<u8>, ApiError> {
        let url = self.config.absolute_url(&attachment.url);
        let (response, attempts) = self.request(&url)?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ATTACHMENT_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::Network {
                url,
                attempts,
                message: e.to_string(),
            })?;
        Ok(bytes)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let (response, _attempts) = self.request(url)?;
        response.into_json().map_err(|e| ApiError::Json {
            url: url.to_owned(),
            source: e,
        })
    }

    /// Issue a GET with the retry loop. Returns the successful response and
    /// the number of attempts it took.
    fn request(&self, url: &str) -> Result<(ureq::Response, u32), ApiError> {
        let mut attempt = 0u32;
        loop {
            tracing::debug!(
                "GET {url} (attempt {}/{})",
                attempt + 1,
                self.policy.max_retries + 1
            );
            let result = self
                .agent
                .get(url)
                .set("Authorization", &format!("Bearer {}", self.config.api_token))
                .set("Accept", "application/json")
                .set("User-Agent", USER_AGENT)
                .timeout(self.policy.timeout_for(attempt))
                .call();

            let failure = match result {
                Ok(response) => return Ok((response, attempt + 1)),
                Err(ureq::Error::Status(code, _)) => Failure::Status(code),
                Err(ureq::Error::Transport(transport)) => {
                    Failure::Transport(transport.to_string())
                }
            };

            match self.policy.decide(attempt, &failure) {
                Decision::Retry { delay } => {
                    tracing::warn!(
                        "attempt {}/{} for {url} failed ({failure:?}); retrying in {delay:?}",
                        attempt + 1,
                        self.policy.max_retries + 1
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Decision::Terminal => {
                    tracing::warn!(
                        "giving up on {url} after {} attempt(s): {failure:?}",
                        attempt + 1
                    );
                    return Err(terminal_error(url, attempt + 1, failure));
                }
            }
        }
    }
}

fn terminal_error(url: &str, attempts: u32, failure: Failure) -> ApiError {
    match failure {
        Failure::Status(status) => ApiError::Http {
            url: url.to_owned(),
            status,
            attempts,
        },
        Failure::Transport(message) => ApiError::Network {
            url: url.to_owned(),
            attempts,
            message,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
