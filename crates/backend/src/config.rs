use std::env;
use std::time::Duration;

use url::Url;

use crate::client::BackendError;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where and how to reach the REST backend.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl BackendConfig {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| BackendError::InvalidConfig(format!("base url {base_url:?}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidConfig(format!(
                "base url must be http(s): {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `ASSESS_API_BASE_URL`, `ASSESS_API_TOKEN` and `ASSESS_HTTP_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` for an unusable base url or timeout.
    pub fn from_env() -> Result<Self, BackendError> {
        let base_url =
            env::var("ASSESS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(token) = env::var("ASSESS_API_TOKEN") {
            config = config.with_token(token);
        }
        if let Ok(raw) = env::var("ASSESS_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                BackendError::InvalidConfig(format!("ASSESS_HTTP_TIMEOUT_SECS={raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs.max(1));
        }
        Ok(config)
    }

    /// Set the bearer token; blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.api_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    /// Append path segments to the base url.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` if the base url cannot take a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidConfig(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
