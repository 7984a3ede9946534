//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _};
use clipdesk_engine::{EngineApi, EngineClient};
use clipdesk_models::{JobState, StyleOverride};
use clipdesk_realtime::ConnectionConfig;
use clipdesk_session::{spawn_session, SessionConfig, SessionError};
use clipdesk_style::PresetCatalog;
use tracing::{info, warn};

use crate::args::{RerenderArgs, RunArgs};
use crate::output::Printer;

pub async fn health(engine: &EngineClient) -> anyhow::Result<()> {
    let health = engine
        .health()
        .await
        .with_context(|| format!("engine at {} is unreachable", engine.config().base_url))?;
    if !health.is_online() {
        bail!("engine reported status {:?}", health.status);
    }
    println!(
        "{} online at {}",
        health.service.as_deref().unwrap_or("engine"),
        engine.config().base_url
    );
    Ok(())
}

pub async fn metadata(engine: &EngineClient, url: &str, json: bool) -> anyhow::Result<()> {
    let metadata = engine.fetch_metadata(url).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("{} ({})", metadata.title, metadata.duration_label());
    }
    Ok(())
}

pub async fn cancel(engine: &EngineClient) -> anyhow::Result<()> {
    engine.cancel_job().await?;
    println!("Cancel requested");
    Ok(())
}

pub async fn rerender(engine: &EngineClient, args: &RerenderArgs) -> anyhow::Result<()> {
    let patch = args.to_patch();
    if patch.is_empty() {
        bail!("nothing to change: pass at least one of --margin-v, --margin-h, --font, --alignment");
    }
    engine
        .rerender_clip(&args.path, &StyleOverride::Partial(patch))
        .await?;
    println!("Re-render requested for {}", args.path);
    Ok(())
}

/// Submit a job and follow it to its outcome.
///
/// The first Ctrl-C asks the engine to cancel and keeps waiting for its
/// `cancelled` status. A second one leaves without waiting.
pub async fn run(
    args: &RunArgs,
    engine: EngineClient,
    connection: ConnectionConfig,
    config: SessionConfig,
) -> anyhow::Result<()> {
    let (handle, task) = spawn_session(
        Arc::new(engine),
        Arc::new(PresetCatalog::builtin()),
        connection,
        config,
    );

    let mut params = args.to_params();
    if !args.no_probe {
        match handle.fetch_metadata(params.source_url.clone()).await {
            Ok(metadata) => {
                println!("{} ({})", metadata.title, metadata.duration_label());
                params.apply_metadata_defaults(&metadata);
            }
            Err(SessionError::Validation(e)) => bail!(e),
            Err(e) => warn!(error = %e, "Metadata probe failed, submitting without it"),
        }
    }

    let wait_open = handle.wait_until(|s| s.connection.is_open());
    if tokio::time::timeout(Duration::from_secs(args.connect_timeout), wait_open)
        .await
        .is_err()
    {
        warn!(
            timeout_secs = args.connect_timeout,
            "Real-time channel not open yet, submitting anyway"
        );
    }

    let request = handle.submit(params).await?;
    info!(
        url = %request.source_url,
        resolution = %request.output_resolution,
        style = request.style_preset.as_deref().unwrap_or("custom"),
        "Job submitted"
    );

    let mut printer = Printer::new();
    let mut snapshots = handle.subscribe();
    let mut cancel_sent = false;

    let outcome = loop {
        let snapshot = snapshots.borrow_and_update().clone();
        printer.print(&snapshot);
        if snapshot.job.is_terminal() {
            break snapshot;
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    bail!("session stopped before the job finished");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if cancel_sent {
                    handle.shutdown().await;
                    bail!("interrupted before the engine confirmed cancellation");
                }
                match handle.cancel().await {
                    Ok(()) => {
                        cancel_sent = true;
                        println!("Cancelling... press Ctrl-C again to exit without waiting");
                    }
                    Err(e) => warn!(error = %e, "Cancel not sent"),
                }
            }
        }
    };

    handle.shutdown().await;
    task.await.context("session task failed")?;

    match outcome.job {
        JobState::Succeeded => {
            println!("Done: {} clip(s)", outcome.clips.len());
            Ok(())
        }
        JobState::Cancelled => {
            println!("Cancelled with {} clip(s)", outcome.clips.len());
            Ok(())
        }
        JobState::Failed { message } => bail!("job failed: {}", message),
        other => bail!("job ended in unexpected state {}", other),
    }
}
