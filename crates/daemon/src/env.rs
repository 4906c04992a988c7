// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use crate::ctx::Config;
use std::path::PathBuf;

/// Default TCP port for the coordinator.
pub const DEFAULT_PORT: u16 = 7117;

/// Resolve data directory: PP_DATA_DIR > XDG_STATE_HOME/pushpals >
/// ~/.local/state/pushpals > ./pushpals-data.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PP_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("pushpals");
    }
    match dirs::home_dir() {
        Some(home) => home.join(".local/state/pushpals"),
        None => PathBuf::from("pushpals-data"),
    }
}

/// TCP port (`PP_PORT`).
pub fn port() -> u16 {
    parse_var("PP_PORT").unwrap_or(DEFAULT_PORT)
}

/// Static bearer token (`PP_AUTH_TOKEN`). Empty means open local mode.
pub fn auth_token() -> Option<String> {
    std::env::var("PP_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

/// Log filter (`PP_LOG`).
pub fn log_filter() -> String {
    std::env::var("PP_LOG").unwrap_or_else(|_| "ppd=info,pp_daemon=info,tower_http=warn".to_string())
}

/// Runtime config from the environment.
pub fn config() -> Config {
    let defaults = Config::default();
    Config {
        auth_token: auth_token(),
        sweep_interval_ms: parse_var("PP_SWEEP_INTERVAL_MS").unwrap_or(defaults.sweep_interval_ms),
        worker_ttl_ms: parse_var("PP_WORKER_TTL_MS").unwrap_or(defaults.worker_ttl_ms),
        online_ttl_ms: parse_var("PP_ONLINE_TTL_MS").unwrap_or(defaults.online_ttl_ms),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
