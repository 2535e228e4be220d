//! Sync run configuration.
//!
//! Constructed once by the caller and threaded as a parameter through every
//! core operation — the engine never reads ambient settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything a sync run needs to reach the remote board.
///
/// All three fields are required; [`SyncConfig::validate`] fails before any
/// network call is made when one is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub api_token: String,
    pub base_url: String,
    pub board_name: String,
}

impl SyncConfig {
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        board_name: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: base_url.into(),
            board_name: board_name.into(),
        }
    }

    /// Fails with the first missing field, in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("api_token", &self.api_token),
            ("base_url", &self.base_url),
            ("board_name", &self.board_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field });
            }
        }
        Ok(())
    }

    /// API root: `<base_url>/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.base_url.trim_end_matches('/'))
    }

    /// Join a board-relative path (attachment URLs) onto the base URL.
    pub fn absolute_url(&self, relative: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if relative.starts_with('/') {
            format!("{base}{relative}")
        } else {
            format!("{base}/{relative}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = SyncConfig::new("token", "https://cards.example.com", "press");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_token_is_reported_first() {
        let config = SyncConfig::new("", "https://cards.example.com", "press");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "api_token" }));
    }

    #[test]
    fn blank_board_name_is_missing() {
        let config = SyncConfig::new("token", "https://cards.example.com", "   ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "board_name" }));
    }

    #[test]
    fn api_url_strips_trailing_slash() {
        let config = SyncConfig::new("t", "https://cards.example.com/", "press");
        assert_eq!(config.api_url(), "https://cards.example.com/api/v1");
    }

    #[test]
    fn absolute_url_joins_either_form() {
        let config = SyncConfig::new("t", "https://cards.example.com", "press");
        assert_eq!(
            config.absolute_url("/attachments/a.png"),
            "https://cards.example.com/attachments/a.png"
        );
        assert_eq!(
            config.absolute_url("attachments/a.png"),
            "https://cards.example.com/attachments/a.png"
        );
    }
}
