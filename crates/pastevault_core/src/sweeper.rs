//! Background expiry sweeper.
//!
//! Runs one sweep at startup and then one per interval on its own tokio task.
//! A failed sweep is logged and the loop carries on; there is no retry until
//! the next tick.

use crate::config::Config;
use crate::error::AppError;
use crate::store::PasteStore;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something the sweeper can purge.
pub trait SweepTarget: Send + Sync + 'static {
    /// Remove entries older than `retention`, returning how many were removed.
    fn sweep(&self, retention: Duration) -> impl Future<Output = Result<usize, AppError>> + Send;
}

impl SweepTarget for PasteStore {
    async fn sweep(&self, retention: Duration) -> Result<usize, AppError> {
        self.expire_older_than(retention).await
    }
}

/// Sweep cadence and retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSchedule {
    pub interval: Duration,
    pub retention: Duration,
}

impl SweepSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.sweep_interval,
            retention: config.retention,
        }
    }
}

/// Counters describing sweeper activity since spawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub completed: u64,
    pub failed: u64,
    pub removed: u64,
}

#[derive(Default)]
struct SweepCounters {
    completed: AtomicU64,
    failed: AtomicU64,
    removed: AtomicU64,
}

impl SweepCounters {
    fn snapshot(&self) -> SweepStats {
        SweepStats {
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
            removed: self.removed.load(Ordering::Acquire),
        }
    }
}

/// Entry point for starting the background sweeper.
pub struct Sweeper;

impl Sweeper {
    /// Start sweeping `target` on the current tokio runtime.
    ///
    /// # Returns
    /// A [`SweeperHandle`]; dropping it signals the task to stop after any
    /// in-flight sweep, and [`SweeperHandle::shutdown`] additionally waits for it.
    pub fn spawn<T: SweepTarget>(target: Arc<T>, schedule: SweepSchedule) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let counters = Arc::new(SweepCounters::default());
        let task = tokio::spawn(run_sweeper(
            target,
            schedule,
            counters.clone(),
            shutdown_rx,
        ));
        tracing::info!(
            interval_secs = schedule.interval.as_secs(),
            retention_secs = schedule.retention.as_secs(),
            "Expiry sweeper started"
        );
        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            counters,
        }
    }
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    counters: Arc<SweepCounters>,
}

impl SweeperHandle {
    /// Current activity counters.
    pub fn stats(&self) -> SweepStats {
        self.counters.snapshot()
    }

    /// Stop the sweeper and wait for an in-flight sweep to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!("Expiry sweeper task ended abnormally: {}", err);
            }
        }
        tracing::info!("Expiry sweeper stopped");
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn run_sweeper<T: SweepTarget>(
    target: Arc<T>,
    schedule: SweepSchedule,
    counters: Arc<SweepCounters>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // tokio panics on a zero period.
    let period = schedule.interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        match target.sweep(schedule.retention).await {
            Ok(removed) => {
                counters.completed.fetch_add(1, Ordering::AcqRel);
                counters.removed.fetch_add(removed as u64, Ordering::AcqRel);
                tracing::debug!(removed, "Expiry sweep finished");
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::AcqRel);
                tracing::error!(kind = err.kind(), "Expiry sweep failed: {}", err);
            }
        }
    }
}
