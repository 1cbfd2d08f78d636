// src/monitor.rs
//! The two long-running polling loops. Each is fetch-and-process, then sleep, forever.
//! Failures inside an iteration are logged by the layers below and never end the loop.

use chrono::{Local, Timelike, Utc};
use metrics::{counter, gauge};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::ActiveHours;
use crate::pipeline::Sentinel;

/// Outcome of one per-symbol sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub symbols: usize,
    pub delivered: usize,
    pub skipped_inactive: bool,
}

/// Whether `hour` (local) is inside the optional active window. No window = always active.
pub fn within_active_hours(window: Option<ActiveHours>, hour: u32) -> bool {
    window.map_or(true, |w| w.contains(hour))
}

/// One pass over every tracked symbol, pausing between symbols for upstream rate limits.
pub async fn sweep_symbols_once(sentinel: &Sentinel) -> SweepReport {
    let settings = sentinel.settings();
    let hour = Local::now().hour();
    if !within_active_hours(settings.schedule.active_hours, hour) {
        tracing::info!(target: "monitor", hour, "outside active hours, skipping sweep");
        return SweepReport {
            skipped_inactive: true,
            ..Default::default()
        };
    }

    let pause = Duration::from_secs(settings.schedule.symbol_pause_secs);
    let mut report = SweepReport::default();
    for (i, symbol) in settings.symbols.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let sent = sentinel.process_query(symbol, Some(symbol)).await;
        report.symbols += 1;
        report.delivered += sent;
    }

    gauge!("sentinel_last_sweep_ts").set(Utc::now().timestamp() as f64);
    tracing::info!(
        target: "monitor",
        symbols = report.symbols,
        delivered = report.delivered,
        "symbol sweep finished"
    );
    report
}

/// One broad market query, no symbol association.
pub async fn market_tick_once(sentinel: &Sentinel) -> usize {
    let query = sentinel.settings().news.market_query.clone();
    let sent = sentinel.process_query(&query, None).await;
    tracing::info!(target: "monitor", delivered = sent, "market check finished");
    sent
}

pub async fn run_symbol_monitor(sentinel: Arc<Sentinel>) {
    let interval = Duration::from_secs(sentinel.settings().schedule.sweep_interval_secs);
    tracing::info!(
        target: "monitor",
        symbols = sentinel.settings().symbols.len(),
        interval_secs = interval.as_secs(),
        "symbol monitor started"
    );
    loop {
        sweep_symbols_once(&sentinel).await;
        tokio::time::sleep(interval).await;
    }
}

pub async fn run_market_monitor(sentinel: Arc<Sentinel>) {
    let interval = Duration::from_secs(sentinel.settings().schedule.market_interval_secs);
    tracing::info!(
        target: "monitor",
        query = %sentinel.settings().news.market_query,
        interval_secs = interval.as_secs(),
        "market monitor started"
    );
    loop {
        market_tick_once(&sentinel).await;
        tokio::time::sleep(interval).await;
    }
}

/// Pause before restarting a monitor that panicked.
pub const RESTART_BACKOFF: Duration = Duration::from_secs(30);

/// Keep a monitor alive: run `make()` as its own task and, if it panics or returns,
/// log it and start a fresh one after `backoff`. Ends only if the task is cancelled.
pub async fn supervise<F, Fut>(name: &'static str, backoff: Duration, mut make: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        match tokio::spawn(make()).await {
            Ok(()) => {
                tracing::warn!(target: "monitor", monitor = name, "monitor returned, restarting");
            }
            Err(e) if e.is_panic() => {
                tracing::error!(target: "monitor", monitor = name, error = %e, "monitor panicked, restarting");
            }
            Err(e) => {
                tracing::warn!(target: "monitor", monitor = name, error = %e, "monitor cancelled");
                return;
            }
        }
        counter!("sentinel_monitor_restarts_total", "monitor" => name).increment(1);
        if !backoff.is_zero() {
            tokio::time::sleep(backoff).await;
        }
    }
}

/// Spawn both monitors under supervision. They share only the sentinel (and its cache).
pub fn spawn_monitors(sentinel: Arc<Sentinel>) -> Vec<JoinHandle<()>> {
    let symbols = sentinel.clone();
    vec![
        tokio::spawn(supervise("symbols", RESTART_BACKOFF, move || {
            run_symbol_monitor(symbols.clone())
        })),
        tokio::spawn(supervise("market", RESTART_BACKOFF, move || {
            run_market_monitor(sentinel.clone())
        })),
    ]
}
