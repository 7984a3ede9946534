//! `clipdesk` binary.

mod args;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipdesk_engine::{EngineClient, EngineClientConfig};
use clipdesk_realtime::ConnectionConfig;
use clipdesk_session::SessionConfig;

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let cli = Cli::parse();

    let mut engine_config = EngineClientConfig::from_env();
    if let Some(url) = &cli.engine_url {
        engine_config = engine_config.with_base_url(url.clone());
    }
    let engine = EngineClient::new(engine_config)?;

    match &cli.cmd {
        Command::Health => commands::health(&engine).await,
        Command::Metadata { url, json } => commands::metadata(&engine, url, *json).await,
        Command::Cancel => commands::cancel(&engine).await,
        Command::Rerender(args) => commands::rerender(&engine, args).await,
        Command::Run(args) => {
            let mut connection = ConnectionConfig::from_env();
            if let Some(url) = &cli.ws_url {
                connection = connection.with_url(url.clone());
            }
            commands::run(args, engine, connection, SessionConfig::from_env()).await
        }
    }
}

/// JSON output with `LOG_FORMAT=json`, coloured text otherwise. Logs go to
/// stderr so stdout carries only command output.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("clipdesk=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}
