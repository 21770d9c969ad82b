//! # checkin-server
//!
//! Daily check-in ledger for group chats.
//!
//! This binary provides:
//! - **Check-in** with a random points or ingots reward, once per day
//! - **Redemption** of points and ingots, with role-based targeting
//! - **Leaderboards** by days checked in this week or month
//! - **Admin reset** and automatic cleanup when a member leaves a group
//! - **REST API** (axum) that platform adapters post normalized events to
//!
//! The ledger lives in a single JSON document that is rewritten atomically
//! after every state change.

mod adapter;
mod api;
mod authz;
mod config;
mod error;
mod ledger;
mod render;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use checkin_shared::period::SystemClock;
use checkin_shared::reward::RandomRewards;
use checkin_store::JsonStore;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::ledger::Ledger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,checkin_server=debug,checkin_store=info")
            }),
        )
        .init();

    info!("Starting check-in server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    let settings = config.settings_provider()?;

    // -----------------------------------------------------------------------
    // 3. Open the ledger document (migrating a legacy copy if needed)
    // -----------------------------------------------------------------------
    let (store, data) = JsonStore::open(&config.data_dir, config.legacy_data_dir.as_deref()).await?;
    info!(
        path = %store.path().display(),
        contexts = data.len(),
        records = data.record_count(),
        "Ledger loaded"
    );

    let app_state = AppState {
        ledger: Arc::new(Ledger::new(store, data, Box::new(RandomRewards))),
        settings,
        clock: Arc::new(SystemClock),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
