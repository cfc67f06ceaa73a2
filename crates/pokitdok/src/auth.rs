//! OAuth2 client-credentials authentication
//!
//! The token request itself is delegated to the `oauth2` crate. This module
//! only decides how the credentials are presented (see [`TokenAuthStyle`]) and
//! converts the grant result into an [`AccessToken`] the client can hold.

use crate::config::{ClientConfig, TokenAuthStyle};
use crate::error::{describe, ApiError, Result};
use chrono::{DateTime, Utc};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, TokenResponse, TokenUrl};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// oauth2 client with only the token endpoint configured
type TokenClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Client ID and secret issued by PokitDok
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token returned by the token endpoint
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    token_type: String,
    expires_in: Option<Duration>,
    scopes: Vec<String>,
    acquired_at: DateTime<Utc>,
}

impl AccessToken {
    pub(crate) fn new(
        secret: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: Option<Duration>,
        scopes: Vec<String>,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            secret: secret.into(),
            token_type: token_type.into(),
            expires_in,
            scopes,
            acquired_at,
        }
    }

    fn from_response(response: &BasicTokenResponse) -> Self {
        let token_type: &str = response.token_type().as_ref();
        let scopes = response
            .scopes()
            .map(|scopes| scopes.iter().map(|scope| scope.as_str().to_string()).collect())
            .unwrap_or_default();

        Self::new(
            response.access_token().secret().clone(),
            token_type,
            response.expires_in(),
            scopes,
            Utc::now(),
        )
    }

    /// The bearer value sent in `Authorization` headers
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime reported by the server at acquisition time
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Instant the token stops being valid, if the server reported a lifetime
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = chrono::Duration::from_std(self.expires_in?).ok()?;
        self.acquired_at.checked_add_signed(lifetime)
    }

    /// Whether the reported lifetime has elapsed.
    ///
    /// Tokens without a reported lifetime never count as expired. Nothing in
    /// the client acts on this; callers decide when to refresh.
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scopes", &self.scopes)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

/// Performs the client-credentials grant against one token endpoint
pub(crate) struct TokenGrant {
    oauth: TokenClient,
    http: reqwest::Client,
    token_url: String,
}

impl TokenGrant {
    pub(crate) fn new(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        let token_url = config.token_url();
        let oauth_token_url = TokenUrl::new(token_url.clone())
            .map_err(|e| ApiError::config(format!("Invalid token URL '{}': {}", token_url, e)))?;

        let (auth_type, headers) = match config.auth_style {
            TokenAuthStyle::LiteralBasicHeader => {
                warn!("Sending a bare 'Authorization: Basic' header to the token endpoint");
                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic"));
                (AuthType::RequestBody, headers)
            },
            TokenAuthStyle::HttpBasic => (AuthType::BasicAuth, HeaderMap::new()),
        };

        let oauth = BasicClient::new(ClientId::new(credentials.client_id().to_string()))
            .set_client_secret(ClientSecret::new(credentials.client_secret().to_string()))
            .set_token_uri(oauth_token_url)
            .set_auth_type(auth_type);

        // Token endpoints must not redirect; following one would leak the credentials
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build token HTTP client: {}", e)))?;

        Ok(Self {
            oauth,
            http,
            token_url,
        })
    }

    /// Request a fresh token
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    pub(crate) async fn request(&self) -> Result<AccessToken> {
        debug!("Requesting client-credentials token");

        let response = self
            .oauth
            .exchange_client_credentials()
            .request_async(&self.http)
            .await
            .map_err(|e| {
                warn!(error = %describe(&e), "Token request failed");
                ApiError::authentication(describe(&e))
            })?;

        let token = AccessToken::from_response(&response);
        info!(
            token_type = %token.token_type(),
            expires_in_secs = token.expires_in().map(|d| d.as_secs()),
            "Acquired access token"
        );
        Ok(token)
    }
}
