// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon context for all request handlers.
//!
//! One `parking_lot` mutex guards the store together with the subscriber
//! registry, so {persist, projection fold, broadcast} is a single
//! critical section and subscribers observe events in cursor order.

use crate::approvals::Approvals;
use chrono::{DateTime, Utc};
use pp_core::scrub::RecentLineFilter;
use pp_core::{Clock, LogStream};
use pp_storage::{Store, StoreError};
use pp_wire::EventFrame;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Runtime configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static bearer token; `None` means open single-user local mode.
    pub auth_token: Option<String>,
    pub sweep_interval_ms: u64,
    /// TTL after which a claimed job's worker counts as lost.
    pub worker_ttl_ms: u64,
    /// TTL for the `isOnline` flag in worker listings.
    pub online_ttl_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            sweep_interval_ms: 5_000,
            worker_ttl_ms: pp_core::worker::STALE_CLAIM_TTL_MS,
            online_ttl_ms: pp_core::worker::ONLINE_TTL_MS,
        }
    }
}

/// One live stream attached to a session.
pub(crate) struct Subscriber {
    pub id: u64,
    pub tx: mpsc::Sender<EventFrame>,
}

/// State behind the coordinator mutex.
pub(crate) struct CoreInner {
    pub store: Store,
    pub subs: HashMap<String, Vec<Subscriber>>,
    pub next_sub_id: u64,
    /// Runtime-only duplicate-line suppression per (job, stream).
    /// Not persisted — repopulates naturally as workers stream logs.
    pub recent_lines: HashMap<(String, LogStream), RecentLineFilter>,
    pub last_sweep_ms: u64,
}

/// Shared handle threaded through every handler.
pub struct AppState<C: Clock> {
    pub(crate) inner: Arc<parking_lot::Mutex<CoreInner>>,
    pub approvals: Approvals,
    pub clock: C,
    pub cfg: Arc<Config>,
    boot_ms: u64,
}

impl<C: Clock> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            approvals: self.approvals.clone(),
            clock: self.clock.clone(),
            cfg: Arc::clone(&self.cfg),
            boot_ms: self.boot_ms,
        }
    }
}

impl<C: Clock> AppState<C> {
    pub fn new(store: Store, clock: C, cfg: Config) -> Self {
        let boot_ms = clock.epoch_ms();
        Self {
            inner: Arc::new(parking_lot::Mutex::new(CoreInner {
                store,
                subs: HashMap::new(),
                next_sub_id: 1,
                recent_lines: HashMap::new(),
                last_sweep_ms: 0,
            })),
            approvals: Approvals::default(),
            clock,
            cfg: Arc::new(cfg),
            boot_ms,
        }
    }

    pub fn uptime_ms(&self) -> u64 {
        self.clock.epoch_ms().saturating_sub(self.boot_ms)
    }

    /// Run the stale-claim sweep (rate-limited).
    pub fn sweep(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        crate::queues::sweep::run_locked(&mut inner, &self.clock, &self.cfg)
    }

    /// Checkpoint the store if enough ledger entries accumulated.
    pub fn maybe_checkpoint(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        if !inner.store.should_checkpoint() {
            return Ok(false);
        }
        inner.store.checkpoint(now)?;
        Ok(true)
    }

    /// Unconditional checkpoint (shutdown path).
    pub fn checkpoint(&self, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.inner.lock().store.checkpoint(now)
    }
}

#[cfg(test)]
pub(crate) fn test_state(dir: &std::path::Path) -> AppState<pp_core::FakeClock> {
    #[allow(clippy::unwrap_used)]
    let store = Store::open(dir).unwrap();
    AppState::new(store, pp_core::FakeClock::new(), Config::default())
}

#[cfg(test)]
pub(crate) fn test_state_with_cfg(
    dir: &std::path::Path,
    cfg: Config,
) -> AppState<pp_core::FakeClock> {
    #[allow(clippy::unwrap_used)]
    let store = Store::open(dir).unwrap();
    AppState::new(store, pp_core::FakeClock::new(), cfg)
}
