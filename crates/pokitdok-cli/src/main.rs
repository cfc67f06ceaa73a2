//! PokitDok CLI - Main entry point

use clap::Parser;
use pokitdok_cli::logging::{init_logging, LogConfig};
use pokitdok_cli::{exit_code, Cli};
use std::process;
use tracing::{error, Level};

#[tokio::main]
async fn main() {
    // A missing .env file is the normal case
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let base_log_config = LogConfig::builder()
        .level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .build();

    // Environment variables take precedence over the verbose flag
    let log_config = LogConfig::from_env(base_log_config.clone()).unwrap_or(base_log_config);

    // The CLI works without logging, so a failed init is not fatal
    let _ = init_logging(&log_config);

    match pokitdok_cli::run(&cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            process::exit(exit_code(&e));
        },
    }
}
