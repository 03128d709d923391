use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to `info`.
/// Calling this function multiple times is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`.
pub(crate) fn elapsed_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Rolling counters across every batch run by an orchestrator.
#[derive(Default, Debug)]
pub struct Telemetry {
    batches: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    items_cancelled: AtomicU64,
}

impl Telemetry {
    pub fn record_batch(&self, succeeded: usize, failed: usize, cancelled: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.items_succeeded
            .fetch_add(succeeded as u64, Ordering::Relaxed);
        self.items_failed.fetch_add(failed as u64, Ordering::Relaxed);
        self.items_cancelled
            .fetch_add(cancelled as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            items_succeeded: self.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            items_cancelled: self.items_cancelled.load(Ordering::Relaxed),
        }
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }
}

/// `items_failed` includes cancelled items; `items_cancelled` breaks them out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub batches: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub items_cancelled: u64,
}
