// Client configuration: credentials, base URL and transport tuning.
//
// Everything here is fixed once an `ApiClient` is built. Values can be set in
// code, deserialized, or read from `STREAMTAPE_*` environment variables.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Origin used when no base URL is supplied.
pub const DEFAULT_API_URL: &str = "https://api.streamtape.com";

pub const ENV_LOGIN: &str = "STREAMTAPE_LOGIN";
pub const ENV_KEY: &str = "STREAMTAPE_KEY";
pub const ENV_API_URL: &str = "STREAMTAPE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "STREAMTAPE_TIMEOUT_SECS";

/// API login/key pair sent as query parameters on every request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub key: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            key: key.into(),
        }
    }
}

/// Keep the API key out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("key", &"<hidden>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// Whole-request timeout in milliseconds. `None` keeps the transport
    /// default; zero is rejected when the transport is built.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl ClientConfig {
    /// Build a configuration; `base_url` loses any trailing slash and falls
    /// back to [`DEFAULT_API_URL`] when `None`.
    pub fn new(credentials: Credentials, base_url: Option<&str>) -> Self {
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(default_api_url);
        Self {
            credentials,
            base_url,
            timeout_ms: None,
            connect_timeout_ms: None,
            user_agent: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis_rounded_up(timeout));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(millis_rounded_up(timeout));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Reject zero timeouts, which would fail every request immediately.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == Some(0) {
            return Err(ApiError::config("timeout must be greater than zero"));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(ApiError::config("connect timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Read the configuration from `STREAMTAPE_LOGIN`, `STREAMTAPE_KEY`,
    /// `STREAMTAPE_API_URL` and `STREAMTAPE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::config(format!("{name} is not set")))
        };
        let credentials = Credentials::new(required(ENV_LOGIN)?, required(ENV_KEY)?);
        let base_url = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty());
        let mut config = Self::new(credentials, base_url.as_deref());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ApiError::config(format!("{ENV_TIMEOUT_SECS} must be an integer: {e}"))
            })?;
            if secs == 0 {
                return Err(ApiError::config(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }
        Ok(config)
    }
}

/// Whole milliseconds, rounding any sub-millisecond remainder up so a
/// non-zero duration never becomes zero.
fn millis_rounded_up(duration: Duration) -> u64 {
    let millis = duration.as_millis();
    let millis = if duration.subsec_nanos() % 1_000_000 != 0 {
        millis + 1
    } else {
        millis
    };
    u64::try_from(millis).unwrap_or(u64::MAX)
}
