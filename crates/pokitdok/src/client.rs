//! HTTP API client for PokitDok
//!
//! Provides one method per REST endpoint on top of a bearer token obtained
//! through the OAuth2 client-credentials grant.

use crate::auth::{AccessToken, Credentials, TokenGrant};
use crate::config::ClientConfig;
use crate::endpoints::{endpoint_url, Endpoint, EndpointKind};
use crate::error::{describe, ApiError, Result};
use crate::params::{query_pairs, Params};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// API client for PokitDok
///
/// A token is acquired while the client is constructed and reused for every
/// call. It is never renewed behind the caller's back: use
/// [`ApiClient::refresh_token`] once [`AccessToken::is_expired`] reports true.
///
/// Refreshing needs `&mut self`, so a refresh can never overlap an in-flight
/// endpoint call on the same client. Share a client across tasks by wrapping
/// it in a lock of your choice.
pub struct ApiClient {
    credentials: Credentials,
    config: ClientConfig,
    http: Client,
    grant: TokenGrant,
    token: AccessToken,
}

impl ApiClient {
    /// Connect to the default API base URL with the given client ID and secret.
    ///
    /// Performs the token request before returning.
    pub async fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_config(
            Credentials::new(client_id, client_secret),
            ClientConfig::default(),
        )
        .await
    }

    /// Connect with an explicit configuration.
    ///
    /// Performs the token request before returning.
    #[instrument(skip_all, fields(base_url = %config.base_url, client_id = %credentials.client_id()))]
    pub async fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let grant = TokenGrant::new(&credentials, &config)?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build HTTP client: {}", e)))?;

        let token = grant.request().await?;

        Ok(Self {
            credentials,
            config,
            http,
            grant,
            token,
        })
    }

    /// Run the client-credentials grant again and replace the held token.
    ///
    /// On failure the previous token is kept.
    pub async fn refresh_token(&mut self) -> Result<&AccessToken> {
        self.token = self.grant.request().await?;
        Ok(&self.token)
    }

    /// The token currently used for requests
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Invoke any endpoint by name.
    ///
    /// The named methods (`activities`, `payers`, ...) all delegate here.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn call(&self, endpoint: Endpoint, params: &Params) -> Result<Value> {
        match endpoint.kind() {
            EndpointKind::Get => self.get(endpoint, params).await,
            EndpointKind::Post => self.post(endpoint, params).await,
            EndpointKind::Unsupported => {
                warn!("Endpoint is not supported by the API");
                Err(ApiError::NotSupported(endpoint))
            },
            EndpointKind::PostThenUnsupported => {
                // The request is still made and its body parsed, but the
                // caller only ever sees the unsupported error.
                let _discarded = self.post(endpoint, params).await?;
                warn!("Endpoint is not supported by the API, response discarded");
                Err(ApiError::NotSupported(endpoint))
            },
        }
    }

    /// Invokes the activities endpoint
    pub async fn activities(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Activities, params).await
    }

    /// Invokes the cash prices endpoint. Always fails with [`ApiError::NotSupported`].
    pub async fn cash_prices(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::CashPrices, params).await
    }

    /// Invokes the claims endpoint.
    ///
    /// The claim is POSTed, but the call always fails with
    /// [`ApiError::NotSupported`] and the response is never returned.
    pub async fn claims(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Claims, params).await
    }

    /// Invokes the claims status endpoint.
    ///
    /// Like [`ApiClient::claims`], the request is sent but the call always
    /// fails with [`ApiError::NotSupported`].
    pub async fn claims_status(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::ClaimsStatus, params).await
    }

    /// Invokes the deductible endpoint. Always fails with [`ApiError::NotSupported`].
    pub async fn deductible(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Deductible, params).await
    }

    /// Invokes the eligibility endpoint
    pub async fn eligibility(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Eligibility, params).await
    }

    /// Invokes the enrollment endpoint
    pub async fn enrollment(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Enrollment, params).await
    }

    /// Invokes the files endpoint
    pub async fn files(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Files, params).await
    }

    /// Invokes the insurance prices endpoint
    pub async fn insurance_prices(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::InsurancePrices, params).await
    }

    /// Invokes the payers endpoint
    pub async fn payers(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Payers, params).await
    }

    /// Invokes the providers endpoint
    pub async fn providers(&self, params: &Params) -> Result<Value> {
        self.call(Endpoint::Providers, params).await
    }

    fn url_for(&self, endpoint: Endpoint) -> Result<String> {
        let path = endpoint.path().ok_or(ApiError::NotSupported(endpoint))?;
        Ok(endpoint_url(&self.config.base_url, path))
    }

    async fn get(&self, endpoint: Endpoint, params: &Params) -> Result<Value> {
        let url = self.url_for(endpoint)?;
        let query = query_pairs(params);
        debug!(url = %url, param_count = query.len(), "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.secret())
            .query(&query)
            .send()
            .await
            .map_err(|e| ApiError::request(endpoint, None, describe(&e)))?;

        Self::parse_response(endpoint, response).await
    }

    async fn post(&self, endpoint: Endpoint, params: &Params) -> Result<Value> {
        let url = self.url_for(endpoint)?;
        debug!(url = %url, param_count = params.len(), "POST");

        // `json` sets `Content-Type: application/json`
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.secret())
            .json(params)
            .send()
            .await
            .map_err(|e| ApiError::request(endpoint, None, describe(&e)))?;

        Self::parse_response(endpoint, response).await
    }

    async fn parse_response(endpoint: Endpoint, response: Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Request returned an error status");
            let message = if body.is_empty() {
                format!("server responded with {}", status)
            } else {
                format!("server responded with {}: {}", status, body)
            };
            return Err(ApiError::request(endpoint, Some(status), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::request(endpoint, Some(status), describe(&e)))?;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::request(
                endpoint,
                Some(status),
                format!("response body is not valid JSON: {}", e),
            )
        })
    }
}
