//! Client configuration baked in at compile time.
//!
//! The browser has no process environment, so deploy-specific values are read
//! with `option_env!` when the WASM bundle is built. Every value has a default
//! that matches the local development backend.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 60;
pub const DEFAULT_EXPIRY_CHECK_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub api_base_url: String,
    /// Refresh the access token when it expires within this many seconds.
    pub refresh_skew_secs: u64,
    /// Interval of the proactive expiry check loop.
    pub expiry_check_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            refresh_skew_secs: DEFAULT_REFRESH_SKEW_SECS,
            expiry_check_interval_secs: DEFAULT_EXPIRY_CHECK_SECS,
        }
    }
}

impl ClientConfig {
    /// Build config from build-time environment variables.
    ///
    /// Optional:
    /// - `LMS_API_BASE_URL`: default `http://localhost:8000`
    /// - `LMS_REFRESH_SKEW_SECS`: default 60
    /// - `LMS_EXPIRY_CHECK_SECS`: default 30
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("LMS_API_BASE_URL"),
            option_env!("LMS_REFRESH_SKEW_SECS"),
            option_env!("LMS_EXPIRY_CHECK_SECS"),
        )
    }

    #[must_use]
    pub fn from_values(base_url: Option<&str>, skew: Option<&str>, check_interval: Option<&str>) -> Self {
        Self {
            api_base_url: normalize_base_url(base_url),
            refresh_skew_secs: parse_secs(skew, DEFAULT_REFRESH_SKEW_SECS),
            expiry_check_interval_secs: parse_secs(check_interval, DEFAULT_EXPIRY_CHECK_SECS).max(1),
        }
    }

    /// Absolute URL for an API path (`path` starts with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

fn normalize_base_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.trim_end_matches('/').to_owned(),
        _ => DEFAULT_API_BASE_URL.to_owned(),
    }
}

fn parse_secs(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok()).unwrap_or(default)
}
