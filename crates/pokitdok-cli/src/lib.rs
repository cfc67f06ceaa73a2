//! PokitDok CLI Library
//!
//! Command-line access to the PokitDok API, one invocation per endpoint call.
//!
//! - **Calling endpoints**: `pokitdok call providers --params '{"zipcode": "94401"}'`
//! - **Listing endpoints**: `pokitdok endpoints`
//!
//! Credentials come from `--client-id`/`--client-secret` or the
//! `POKITDOK_CLIENT_ID`/`POKITDOK_CLIENT_SECRET` environment variables.

pub mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pokitdok::{ApiClient, ApiError, ClientConfig, Credentials, Endpoint, EndpointKind, Params, TokenAuthStyle};
use serde_json::Value;
use std::time::Duration;

/// Exit code for failures other than unsupported endpoints
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when the requested endpoint is not supported by the API
pub const EXIT_NOT_SUPPORTED: i32 = 3;

/// PokitDok API command-line client
#[derive(Parser, Debug)]
#[command(name = "pokitdok")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// OAuth2 client ID
    #[arg(long, env = "POKITDOK_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = "POKITDOK_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// API base URL
    #[arg(long, env = "POKITDOK_BASE_URL", default_value = pokitdok::DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Token endpoint path relative to the base URL
    #[arg(long, env = "POKITDOK_TOKEN_PATH", default_value = pokitdok::DEFAULT_TOKEN_PATH, global = true)]
    pub token_path: String,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, env = "POKITDOK_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// How credentials are sent to the token endpoint (literal, basic)
    #[arg(long, env = "POKITDOK_AUTH_STYLE", default_value = "literal", global = true)]
    pub auth_style: TokenAuthStyle,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call an API endpoint and print its JSON response
    Call {
        /// Endpoint name (e.g. "providers", "insurance_prices")
        endpoint: Endpoint,

        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Print compact JSON instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,
    },

    /// List the known endpoints
    Endpoints,
}

/// Execute the parsed command, returning what should be printed to stdout
pub async fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Endpoints => Ok(endpoint_table()),
        Commands::Call {
            endpoint,
            params,
            compact,
        } => {
            let params = parse_params(params)?;
            let client = connect(cli).await?;
            let response = client.call(*endpoint, &params).await?;
            render(&response, *compact)
        },
    }
}

/// Parse `--params`, which must be a JSON object
pub fn parse_params(raw: &str) -> Result<Params> {
    let value: Value = serde_json::from_str(raw).context("--params is not valid JSON")?;
    match value {
        Value::Object(params) => Ok(params),
        other => bail!(
            "--params must be a JSON object, got {}",
            json_type_name(&other)
        ),
    }
}

/// Exit code for a failed run
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) if api_error.is_not_supported() => EXIT_NOT_SUPPORTED,
        _ => EXIT_FAILURE,
    }
}

fn client_config(cli: &Cli) -> ClientConfig {
    let mut builder = ClientConfig::builder()
        .base_url(cli.base_url.clone())
        .token_path(cli.token_path.clone())
        .auth_style(cli.auth_style);
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

async fn connect(cli: &Cli) -> Result<ApiClient> {
    let (Some(client_id), Some(client_secret)) = (&cli.client_id, &cli.client_secret) else {
        bail!("Missing credentials. Pass --client-id and --client-secret or set POKITDOK_CLIENT_ID and POKITDOK_CLIENT_SECRET.");
    };

    let client = ApiClient::with_config(
        Credentials::new(client_id.clone(), client_secret.clone()),
        client_config(cli),
    )
    .await?;
    Ok(client)
}

fn render(response: &Value, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    Ok(text)
}

fn endpoint_table() -> String {
    Endpoint::ALL
        .iter()
        .map(|endpoint| {
            let verb = endpoint.method().map(|m| m.to_string()).unwrap_or_else(|| "-".to_string());
            let path = endpoint.path().unwrap_or("-");
            let note = match endpoint.kind() {
                EndpointKind::Get | EndpointKind::Post => "",
                EndpointKind::Unsupported => "not supported",
                EndpointKind::PostThenUnsupported => "sent, then reported unsupported",
            };
            format!("{:<18}{:<6}{:<18}{}", endpoint.name(), verb, path, note)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
