mod auth;
mod config;
mod dashboard;
mod snapshot;
mod stats;
mod store;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::{config::Settings, snapshot::SnapshotState, store::SqliteStore, utils::now_ts};

#[derive(Debug, Parser)]
#[command(name = "uwtrack", version)]
struct Cli {
    /// Override DASHBOARD_HOST
    #[arg(long)]
    host: Option<String>,

    /// Override DASHBOARD_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(h) = cli.host {
        settings.dashboard_host = h;
    }
    if let Some(p) = cli.port {
        settings.dashboard_port = p;
    }

    let store = SqliteStore::new(&settings.sqlite_path)?;
    store.init_db()?;

    let snapshot = SnapshotState::new();
    let warm = snapshot.refresh(&store)?;
    store.purge_expired_sessions(now_ts()).ok();

    log::info!(
        "app.start host={} port={} sqlite={} records={}",
        settings.dashboard_host,
        settings.dashboard_port,
        store.path(),
        warm
    );

    // Periodic snapshot refresh catches writes made outside the admin API
    // (e.g. imports directly into the SQLite file).
    {
        let snapshot = snapshot.clone();
        let store = store.clone();
        let refresh_secs = settings.snapshot_refresh_secs;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(std::time::Duration::from_secs(refresh_secs));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                match snapshot.refresh(&store) {
                    Ok(n) => log::debug!("snapshot.refresh records={n}"),
                    Err(e) => log::warn!("snapshot.refresh_failed {e}"),
                }
                store.purge_expired_sessions(now_ts()).ok();
            }
        });
    }

    if settings.dashboard_open_browser {
        let url = format!(
            "http://{}:{}/",
            settings.dashboard_host, settings.dashboard_port
        );
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(650)).await;
            let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        });
    }

    dashboard::serve_dashboard(settings, store, snapshot).await
}
