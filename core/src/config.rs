//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Production endpoint of the Trust Lifecycle Manager.
pub const DEFAULT_BASE_URL: &str = "https://one.digicert.com";

/// API version segment in every endpoint path.
pub const API_VERSION: &str = "v1";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sent as `User-Agent` unless overridden.
pub fn default_user_agent() -> String {
    format!("tlm-core/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings for [`Client`](crate::Client).
#[derive(Clone)]
pub struct ClientConfig {
    /// Sent as `X-API-Key` on every request.
    pub api_key: String,
    /// Scheme and host of the tenant, optionally with a path prefix.
    pub base_url: String,
    /// Empty disables the header.
    pub user_agent: String,
    /// Per-call deadline enforced by the transport.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIGICERT_API_KEY`: API key (required)
    /// - `DIGICERT_BASE_URL`: tenant base URL
    /// - `DIGICERT_USER_AGENT`: user agent override
    /// - `DIGICERT_TIMEOUT_SECS`: per-call timeout in whole seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is missing or the timeout is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_key = lookup("DIGICERT_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("DIGICERT_API_KEY is not set".to_string()))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("DIGICERT_BASE_URL") {
            config.base_url = url;
        }

        if let Some(ua) = lookup("DIGICERT_USER_AGENT") {
            config.user_agent = ua;
        }

        if let Some(secs) = lookup("DIGICERT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                Error::Config(format!("invalid DIGICERT_TIMEOUT_SECS {secs:?}: {e}"))
            })?;
            if secs == 0 {
                return Err(Error::Config(
                    "invalid DIGICERT_TIMEOUT_SECS \"0\": must be at least one second".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Check the settings and return the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty API key, a zero timeout, or a
    /// base URL that is not an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<Url, Error> {
        if self.api_key.is_empty() {
            return Err(Error::Config("API key is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid base URL {:?}: unsupported scheme {}",
                self.base_url,
                url.scheme()
            )));
        }

        Ok(url)
    }
}
