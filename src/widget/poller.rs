//! Results Poller
//!
//! Background loop that keeps the active category fresh: one fetch right
//! away, then one per interval. Ticks are skipped while the chart is
//! hidden; becoming visible again or a reset signal triggers an
//! immediate fetch. Fetch failures never leave this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::live::Shared;
use super::{PollApply, PollTicket};
use crate::results::ResultsError;

/// Default polling interval
pub const DEFAULT_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Poller counters for one chart instance
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollStats {
    pub successes: u64,
    pub failures: u64,
    pub skipped_hidden: u64,
    pub discarded_stale: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Most recent failure, kept after later successes
    pub last_error: Option<String>,
}

/// "Votes were reset, refetch now" marker shared by every chart on a host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSignal {
    pub issued_at: DateTime<Utc>,
}

impl ResetSignal {
    pub fn now() -> Self {
        Self {
            issued_at: Utc::now(),
        }
    }
}

/// Counts running loops; decremented when the loop future is dropped,
/// including on abort.
struct LiveLoopGuard<'a>(&'a AtomicUsize);

impl<'a> LiveLoopGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LiveLoopGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(super) async fn run(
    shared: Arc<Shared>,
    ticket: PollTicket,
    config: PollerConfig,
    mut reset: Option<broadcast::Receiver<ResetSignal>>,
) {
    let _live = LiveLoopGuard::enter(&shared.live_loops);
    let mut visible = shared.visible.subscribe();

    tracing::debug!(
        index = ticket.index,
        generation = ticket.generation,
        interval_ms = config.interval_ms,
        "Poller started"
    );

    fetch_and_apply(&shared, ticket).await;

    let period = config.interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !*visible.borrow() {
                    shared.stats.write().await.skipped_hidden += 1;
                    tracing::trace!(index = ticket.index, "Chart hidden, tick skipped");
                    continue;
                }
                fetch_and_apply(&shared, ticket).await;
            }
            changed = visible.changed() => {
                if changed.is_err() {
                    break;
                }
                if *visible.borrow_and_update() {
                    tracing::debug!(index = ticket.index, "Chart visible again, refreshing");
                    fetch_and_apply(&shared, ticket).await;
                }
            }
            signal = next_reset(&mut reset) => {
                match signal {
                    Ok(signal) => {
                        tracing::debug!(index = ticket.index, issued_at = %signal.issued_at, "Reset signal, refreshing");
                        fetch_and_apply(&shared, ticket).await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "Reset signals lagged, refreshing once");
                        fetch_and_apply(&shared, ticket).await;
                    }
                    Err(RecvError::Closed) => {
                        reset = None;
                    }
                }
            }
        }
    }
}

async fn next_reset(
    reset: &mut Option<broadcast::Receiver<ResetSignal>>,
) -> Result<ResetSignal, RecvError> {
    match reset {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One fetch for `ticket`, applied through the stale guard
pub(super) async fn fetch_and_apply(shared: &Shared, ticket: PollTicket) -> Option<PollApply> {
    let category_number = {
        let widget = shared.widget.lock().await;
        widget.catalog().get(ticket.index)?.number
    };

    match shared.api.fetch_results(category_number).await {
        Ok(counts) => {
            let mut widget = shared.widget.lock().await;
            let outcome = widget.apply_poll_result(ticket, counts);
            if let PollApply::Rendered(chart) = &outcome {
                shared.publish(chart.clone()).await;
            }
            drop(widget);

            {
                let mut stats = shared.stats.write().await;
                stats.successes += 1;
                stats.last_success_at = Some(Utc::now());
                if matches!(outcome, PollApply::Stale) {
                    stats.discarded_stale += 1;
                    tracing::debug!(
                        index = ticket.index,
                        generation = ticket.generation,
                        "Discarded stale poll result"
                    );
                }
            }

            Some(outcome)
        }
        Err(e) => {
            record_failure(shared, ticket, &e).await;
            None
        }
    }
}

async fn record_failure(shared: &Shared, ticket: PollTicket, error: &ResultsError) {
    tracing::debug!(
        index = ticket.index,
        error = %error,
        "Results poll failed"
    );

    {
        let mut stats = shared.stats.write().await;
        stats.failures += 1;
        stats.last_error = Some(error.to_string());
    }

    if let Some(hook) = &shared.on_poll_error {
        hook(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(PollerConfig::default().interval(), Duration::from_millis(3000));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = PollerConfig { interval_ms: 0 };
        assert_eq!(config.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_live_loop_guard_counts() {
        let counter = AtomicUsize::new(0);
        {
            let _a = LiveLoopGuard::enter(&counter);
            let _b = LiveLoopGuard::enter(&counter);
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reset_signal_serializes() {
        let json = serde_json::to_value(ResetSignal::now()).unwrap();
        assert!(json.get("issued_at").is_some());
    }
}
