//! Retry policy.
//!
//! The decision to retry is a pure function of `(attempt, failure kind)` —
//! an explicit loop in the client consults it; there is no recursion and no
//! hidden state. Defaults match the board API's observed tolerances:
//! 3 retries, 2s/4s/8s backoff, 20s base timeout growing per attempt.

use std::time::Duration;

/// Why an attempt failed, as far as retry classification cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Connection-level failure, including timeouts.
    Transport(String),
    /// Non-success HTTP status.
    Status(u16),
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Sleep for `delay`, then try again.
    Retry { delay: Duration },
    /// Surface the failure as a terminal error.
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Unit scaled by `2^(attempt+1)`; zero disables sleeping (tests).
    pub backoff_base: Duration,
    /// Per-attempt timeout grows as `timeout_base * (1 + attempt)`.
    pub timeout_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            timeout_base: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Same classification, zero sleep. For tests.
    pub fn without_backoff() -> Self {
        Self {
            backoff_base: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Timeout for the given zero-based attempt: `base * (1 + attempt)`.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.timeout_base * (1 + attempt)
    }

    /// Backoff before the retry that follows zero-based `attempt`:
    /// `base * 2^(attempt + 1)` — 2s, 4s, 8s at the default base.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.pow(attempt + 1)
    }

    /// Classify a failed attempt. Retryable: transport failures (network,
    /// timeout), HTTP 5xx, and HTTP 429 — until the retry budget is spent.
    /// Everything else is terminal.
    pub fn decide(&self, attempt: u32, failure: &Failure) -> Decision {
        if attempt >= self.max_retries {
            return Decision::Terminal;
        }
        let retryable = match failure {
            Failure::Transport(_) => true,
            Failure::Status(code) => *code >= 500 || *code == 429,
        };
        if retryable {
            Decision::Retry {
                delay: self.backoff_for(attempt),
            }
        } else {
            Decision::Terminal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(8));
    }

    #[test]
    fn timeout_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout_for(0), Duration::from_secs(20));
        assert_eq!(policy.timeout_for(1), Duration::from_secs(40));
        assert_eq!(policy.timeout_for(2), Duration::from_secs(60));
        assert_eq!(policy.timeout_for(3), Duration::from_secs(80));
    }

    #[test]
    fn transport_failures_are_retried() {
        let policy = RetryPolicy::default();
        let failure = Failure::Transport("connection reset".into());
        assert_eq!(
            policy.decide(0, &failure),
            Decision::Retry {
                delay: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn server_errors_and_rate_limits_are_retried() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.decide(1, &Failure::Status(503)),
            Decision::Retry { .. }
        ));
        assert!(matches!(
            policy.decide(1, &Failure::Status(429)),
            Decision::Retry { .. }
        ));
    }

    #[test]
    fn client_errors_are_terminal() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(0, &Failure::Status(404)), Decision::Terminal);
        assert_eq!(policy.decide(0, &Failure::Status(401)), Decision::Terminal);
    }

    #[test]
    fn budget_exhaustion_is_terminal_even_for_retryable_failures() {
        let policy = RetryPolicy::default();
        let failure = Failure::Transport("timeout".into());
        assert!(matches!(policy.decide(2, &failure), Decision::Retry { .. }));
        assert_eq!(policy.decide(3, &failure), Decision::Terminal);
    }

    #[test]
    fn without_backoff_keeps_classification() {
        let policy = RetryPolicy::without_backoff();
        assert_eq!(
            policy.decide(0, &Failure::Status(500)),
            Decision::Retry {
                delay: Duration::ZERO
            }
        );
        assert_eq!(policy.decide(0, &Failure::Status(400)), Decision::Terminal);
    }
}
