//! PokitDok API client
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Thin asynchronous wrapper around the PokitDok v3 REST API.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 client-credentials grant, performed once when the
//!   client is constructed and again on demand via [`ApiClient::refresh_token`]
//! - **Endpoints**: one method per REST endpoint, each returning the decoded JSON
//!   body as a [`serde_json::Value`]
//! - **Errors**: a single [`ApiError`] type covering authentication, request and
//!   unsupported-endpoint failures
//!
//! Tokens are never refreshed automatically. Callers that hold a client for
//! longer than the token lifetime should check [`AccessToken::is_expired`] and
//! call [`ApiClient::refresh_token`] themselves.
//!
//! # Example
//!
//! ```no_run
//! use pokitdok::{ApiClient, Params};
//!
//! # async fn example() -> pokitdok::Result<()> {
//! let client = ApiClient::new("my-client-id", "my-client-secret").await?;
//!
//! let mut params = Params::new();
//! params.insert("zipcode".into(), "94401".into());
//! let providers = client.providers(&params).await?;
//! println!("{providers:#}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod params;

// Re-export commonly used types
pub use auth::{AccessToken, Credentials};
pub use client::ApiClient;
pub use config::{ClientConfig, TokenAuthStyle, DEFAULT_BASE_URL, DEFAULT_TOKEN_PATH};
pub use endpoints::{Endpoint, EndpointKind};
pub use error::{ApiError, Result};
pub use params::Params;
