//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `LIVE_QUEUE_*` environment variables or a configuration
//! file. Out-of-range durations are clamped rather than rejected.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::CoordinatorConfig;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1/";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
const POLL_INTERVAL_RANGE: (u64, u64) = (1, 300);
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_RANGE: (u64, u64) = (1, 120);
const DEFAULT_RECOVERY_DIR: &str = ".live-queue";

/// Errors raised when settings values cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The API base URL does not parse or is not http(s).
    #[error("invalid API base URL {value:?}: {reason}")]
    InvalidApiBaseUrl {
        /// Configured value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Configuration for the live queue client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIVE_QUEUE")]
pub struct LiveQueueSettings {
    /// Base URL of the marketplace API.
    pub api_base_url: Option<String>,
    /// Seconds between position polls.
    pub poll_interval_secs: Option<u64>,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Directory holding recovery records.
    pub recovery_dir: Option<PathBuf>,
    /// Keep recovery records in memory only.
    #[ortho_config(default = false)]
    pub ephemeral_recovery: bool,
}

impl LiveQueueSettings {
    /// Parsed API base URL. A trailing slash is added so relative endpoint
    /// paths resolve below it.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidApiBaseUrl`] when the value does not
    /// parse or uses a scheme other than http or https.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let invalid = |reason: String| SettingsError::InvalidApiBaseUrl {
            value: raw.to_owned(),
            reason,
        };
        let mut url = Url::parse(raw).map_err(|error| invalid(error.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Poll interval, clamped to between 1 and 300 seconds.
    pub fn poll_interval(&self) -> Duration {
        let (min, max) = POLL_INTERVAL_RANGE;
        Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                .clamp(min, max),
        )
    }

    /// HTTP request timeout, clamped to between 1 and 120 seconds.
    pub fn request_timeout(&self) -> Duration {
        let (min, max) = REQUEST_TIMEOUT_RANGE;
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .clamp(min, max),
        )
    }

    /// Directory holding recovery records.
    pub fn recovery_dir(&self) -> PathBuf {
        self.recovery_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RECOVERY_DIR))
    }

    /// Coordinator tunables derived from these settings.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            poll_interval: self.poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "LIVE_QUEUE_API_BASE_URL",
        "LIVE_QUEUE_POLL_INTERVAL_SECS",
        "LIVE_QUEUE_REQUEST_TIMEOUT_SECS",
        "LIVE_QUEUE_RECOVERY_DIR",
        "LIVE_QUEUE_EPHEMERAL_RECOVERY",
    ];

    fn load_from_empty_args() -> LiveQueueSettings {
        LiveQueueSettings::load_from_iter([OsString::from("live-queue")])
            .expect("config should load")
    }

    fn cleared() -> [(&'static str, Option<String>); 5] {
        VARS.map(|name| (name, None::<String>))
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert!(!settings.ephemeral_recovery);
        assert_eq!(
            settings.api_base_url().expect("default url").as_str(),
            DEFAULT_API_BASE_URL
        );
        assert_eq!(settings.poll_interval(), Duration::from_secs(15));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.recovery_dir(), PathBuf::from(".live-queue"));
        assert_eq!(
            settings.coordinator_config().poll_interval,
            Duration::from_secs(15)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "LIVE_QUEUE_API_BASE_URL",
                Some("https://market.example/api".to_owned()),
            ),
            ("LIVE_QUEUE_POLL_INTERVAL_SECS", Some("5".to_owned())),
            ("LIVE_QUEUE_REQUEST_TIMEOUT_SECS", Some("30".to_owned())),
            ("LIVE_QUEUE_RECOVERY_DIR", Some("/tmp/booths".to_owned())),
            ("LIVE_QUEUE_EPHEMERAL_RECOVERY", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.ephemeral_recovery);
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            "https://market.example/api/"
        );
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.recovery_dir(), PathBuf::from("/tmp/booths"));
    }

    #[rstest]
    #[case::too_fast(0, 1)]
    #[case::too_slow(3_600, 300)]
    fn poll_interval_is_clamped(#[case] configured: u64, #[case] expected: u64) {
        let _guard = lock_env([
            ("LIVE_QUEUE_POLL_INTERVAL_SECS", Some(configured.to_string())),
            ("LIVE_QUEUE_REQUEST_TIMEOUT_SECS", Some("999".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.poll_interval(), Duration::from_secs(expected));
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
    }

    #[rstest]
    #[case::not_a_url("not a url")]
    #[case::wrong_scheme("ftp://market.example/")]
    fn bad_base_urls_are_rejected(#[case] raw: &str) {
        let _guard = lock_env([("LIVE_QUEUE_API_BASE_URL", Some(raw.to_owned()))]);

        let settings = load_from_empty_args();
        let err = settings.api_base_url().expect_err("invalid url");
        assert!(matches!(err, SettingsError::InvalidApiBaseUrl { .. }));
    }
}
