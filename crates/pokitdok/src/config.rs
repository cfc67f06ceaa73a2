//! Client configuration
//!
//! The defaults target a local PokitDok deployment. Everything can be
//! overridden programmatically through [`ClientConfig::builder`] or from the
//! environment with [`ClientConfig::from_env`].

use crate::endpoints::endpoint_url;
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

// ============================================================================
// Client Configuration Constants
// ============================================================================

/// API base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5002/api/v3";

/// Token endpoint path, relative to the API base URL.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth2/token";

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenAuthStyle {
    /// Credentials in the form body plus a bare `Authorization: Basic` header
    /// carrying no credential value.
    ///
    /// This is what deployed PokitDok clients send and what the server has been
    /// observed to accept. It is almost certainly a mistake on the client side,
    /// but it stays the default until the intended semantics are confirmed.
    #[default]
    LiteralBasicHeader,
    /// RFC 6749 HTTP Basic authentication with the encoded client ID and secret.
    HttpBasic,
}

impl FromStr for TokenAuthStyle {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" | "literal_basic" | "literal_basic_header" => {
                Ok(TokenAuthStyle::LiteralBasicHeader)
            },
            "basic" | "http_basic" => Ok(TokenAuthStyle::HttpBasic),
            _ => Err(ApiError::config(format!(
                "Invalid token auth style '{}'. Expected 'literal' or 'basic'.",
                s
            ))),
        }
    }
}

impl fmt::Display for TokenAuthStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenAuthStyle::LiteralBasicHeader => write!(f, "literal"),
            TokenAuthStyle::HttpBasic => write!(f, "basic"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:5002/api/v3`
    pub base_url: String,

    /// Token endpoint path relative to `base_url`
    pub token_path: String,

    /// Per-request timeout; `None` leaves the transport default (no timeout)
    pub timeout: Option<Duration>,

    /// How credentials are sent to the token endpoint
    pub auth_style: TokenAuthStyle,

    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            timeout: None,
            auth_style: TokenAuthStyle::default(),
            user_agent: format!("pokitdok-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from environment variables
    ///
    /// Environment variables:
    /// - `POKITDOK_BASE_URL`: API base URL
    /// - `POKITDOK_TOKEN_PATH`: token endpoint path relative to the base URL
    /// - `POKITDOK_TIMEOUT_SECS`: request timeout in seconds
    /// - `POKITDOK_AUTH_STYLE`: `literal` or `basic`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("POKITDOK_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(path) = std::env::var("POKITDOK_TOKEN_PATH") {
            config.token_path = path;
        }

        if let Ok(secs) = std::env::var("POKITDOK_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ApiError::config(format!(
                    "POKITDOK_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(style) = std::env::var("POKITDOK_AUTH_STYLE") {
            config.auth_style = style.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Absolute URL of the token endpoint
    pub fn token_url(&self) -> String {
        endpoint_url(&self.base_url, &self.token_path)
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ApiError::config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ApiError::config(format!(
                "Unsupported base URL scheme '{}' in '{}'. Use http or https.",
                other, self.base_url
            ))),
        }
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn token_path(mut self, path: impl Into<String>) -> Self {
        self.config.token_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn auth_style(mut self, style: TokenAuthStyle) -> Self {
        self.config.auth_style = style;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 4] = [
        "POKITDOK_BASE_URL",
        "POKITDOK_TOKEN_PATH",
        "POKITDOK_TIMEOUT_SECS",
        "POKITDOK_AUTH_STYLE",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.base_url, "http://localhost:5002/api/v3");
        assert_eq!(config.token_url(), "http://localhost:5002/api/v3/oauth2/token");
        assert_eq!(config.timeout, None);
        assert_eq!(config.auth_style, TokenAuthStyle::LiteralBasicHeader);
        assert!(config.user_agent.starts_with("pokitdok-rust/"));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .base_url("https://platform.pokitdok.com/api/v4/")
            .token_path("oauth2/token")
            .timeout(Duration::from_secs(30))
            .auth_style(TokenAuthStyle::HttpBasic)
            .user_agent("test-agent")
            .build();

        assert_eq!(
            config.token_url(),
            "https://platform.pokitdok.com/api/v4/oauth2/token"
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.auth_style, TokenAuthStyle::HttpBasic);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());

        let err = ClientConfig::builder().base_url("not a url").build().validate();
        assert!(matches!(err, Err(ApiError::Config(_))));

        let err = ClientConfig::builder()
            .base_url("ftp://localhost/api/v3")
            .build()
            .validate();
        assert!(matches!(err, Err(ApiError::Config(msg)) if msg.contains("ftp")));
    }

    #[test]
    fn test_auth_style_parse() {
        assert_eq!(
            "literal".parse::<TokenAuthStyle>().unwrap(),
            TokenAuthStyle::LiteralBasicHeader
        );
        assert_eq!("BASIC".parse::<TokenAuthStyle>().unwrap(), TokenAuthStyle::HttpBasic);
        assert!("bearer".parse::<TokenAuthStyle>().is_err());
        assert_eq!(TokenAuthStyle::HttpBasic.to_string(), "basic");
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("POKITDOK_BASE_URL", "http://example.com/api/v3");
        std::env::set_var("POKITDOK_TIMEOUT_SECS", "15");
        std::env::set_var("POKITDOK_AUTH_STYLE", "basic");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://example.com/api/v3");
        assert_eq!(config.token_path, DEFAULT_TOKEN_PATH);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.auth_style, TokenAuthStyle::HttpBasic);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_from_env_rejects_bad_timeout() {
        clear_env();
        std::env::set_var("POKITDOK_TIMEOUT_SECS", "soon");

        let err = ClientConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("POKITDOK_TIMEOUT_SECS"));

        clear_env();
    }
}
