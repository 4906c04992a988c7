// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ppd` — the PushPals pipeline coordinator daemon.

use pp_core::{Clock, SystemClock};
use pp_daemon::{build_router, env, AppState};
use pp_storage::Store;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env::log_filter()))
        .init();

    let cfg = env::config();
    let data_dir = env::data_dir();
    let store = match Store::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            error!(dir = %data_dir.display(), "cannot open store: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(store, SystemClock, cfg);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], env::port()));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "cannot bind: {e}");
            std::process::exit(1);
        }
    };
    info!(%addr, auth = state.cfg.auth_token.is_some(), "coordinator listening");

    let tick_state = state.clone();
    tokio::spawn(async move { background_tick(tick_state).await });

    let result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    if let Err(e) = state.checkpoint(SystemClock.now_utc()) {
        warn!("final checkpoint failed: {e}");
    }
    if let Err(e) = result {
        error!("server error: {e}");
        std::process::exit(1);
    }
    info!("coordinator stopped");
}

/// Periodic maintenance: stale-claim sweep plus checkpointing.
async fn background_tick(state: AppState<SystemClock>) {
    let mut interval = tokio::time::interval(Duration::from_secs(5));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if let Err(e) = state.sweep() {
            warn!("sweep failed: {e}");
        }
        match state.maybe_checkpoint(state.clock.now_utc()) {
            Ok(true) => info!("checkpoint written"),
            Ok(false) => {}
            Err(e) => warn!("checkpoint failed: {e}"),
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}
