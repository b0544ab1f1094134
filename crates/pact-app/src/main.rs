mod connectivity;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use pact_engine::{SyncCoordinator, spawn_reminders, summary_for};
use pact_store::{LocalMirror, PactRepository, RecordStore, RemoteClient, RemoteConfig};
use pact_types::{Notice, Severity, UserId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pact=debug".into()),
        )
        .init();

    // Config
    let data_dir: PathBuf = std::env::var("PACT_DATA_DIR")
        .unwrap_or_else(|_| "./pact-data".into())
        .into();
    let remote_url = std::env::var("PACT_REMOTE_URL").unwrap_or_default();
    let api_key = std::env::var("PACT_REMOTE_API_KEY").unwrap_or_default();
    let active_user = match std::env::var("PACT_ACTIVE_USER").as_deref() {
        Ok("user_b") => UserId::UserB,
        Ok("user_a") | Err(_) => UserId::UserA,
        Ok(other) => {
            eprintln!("FATAL: PACT_ACTIVE_USER must be user_a or user_b, got {other:?}");
            std::process::exit(1);
        }
    };
    let reminder_poll_secs: u64 = std::env::var("PACT_REMINDER_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let connectivity_poll_secs: u64 = std::env::var("PACT_CONNECTIVITY_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(120);

    // The remote client is built here and injected; nothing else ever
    // constructs one. An empty URL means offline-only operation.
    let remote = if remote_url.is_empty() {
        info!("PACT_REMOTE_URL unset; running offline against the local mirror");
        None
    } else {
        Some(RemoteClient::new(RemoteConfig {
            base_url: remote_url,
            api_key,
        }))
    };

    let mirror = LocalMirror::open(data_dir).await?;
    let store = Arc::new(RecordStore::new(remote, mirror));
    let repo = PactRepository::new(store.clone());

    let (notice_tx, mut notice_rx) = tokio::sync::mpsc::unbounded_channel::<Notice>();
    let coordinator = Arc::new(SyncCoordinator::new(repo, notice_tx.clone()));

    // Boot: load whatever the backends hold.
    coordinator.refresh().await?;
    let state = coordinator.snapshot()?;
    let today = chrono::Local::now().date_naive();
    let summary = summary_for(active_user, &state.logs, &state.pacts, today);
    info!(
        "Signed in as {}: {} active pacts, {} completions, streak {} (best {})",
        active_user,
        summary.total_pacts,
        summary.total_completed,
        summary.current_streak,
        summary.longest_streak
    );

    // Presentation boundary: here, notices just become log lines.
    let notice_task = tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            match notice.severity {
                Severity::Info => info!("{}: {}", notice.title, notice.description),
                Severity::Warning | Severity::Error => {
                    warn!("{}: {}", notice.title, notice.description)
                }
            }
        }
    });

    let reminders = spawn_reminders(
        coordinator.clone(),
        active_user,
        notice_tx,
        Duration::from_secs(reminder_poll_secs),
    );
    let connectivity = tokio::spawn(connectivity::run_connectivity_loop(
        store,
        coordinator,
        connectivity_poll_secs,
    ));

    shutdown_signal().await;

    reminders.stop();
    connectivity.abort();
    notice_task.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
