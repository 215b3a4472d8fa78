//! Recurring-task scheduler for the polling loops.
//!
//! Each feed gets its own spawned interval loop; loops are not
//! synchronized with one another and a failing cycle never cancels its
//! own schedule, let alone anyone else's. Dropping the [`PollerSet`]
//! aborts every loop, so teardown can never leak a timer, and any
//! in-flight fetch dies with its task instead of committing state late.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

// ---

/// Owns the running polling loops for the lifetime of the process.
#[derive(Default)]
pub struct PollerSet {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl PollerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a named loop running `task` every `every`.
    ///
    /// The factory is called once per tick to build that cycle's future;
    /// an `Err` is logged and the loop keeps ticking.
    pub fn spawn<F, Fut>(&mut self, name: &'static str, every: Duration, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send,
    {
        // ---
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = task().await {
                    tracing::error!("poller '{}' cycle failed: {:#}", name, err);
                }
            }
        });
        tracing::info!("poller '{}' running every {:?}", name, every);
        self.handles.push((name, handle));
    }

    /// Abort every loop. Also happens implicitly on drop.
    pub fn shutdown(&mut self) {
        // ---
        for (name, handle) in self.handles.drain(..) {
            tracing::info!("stopping poller '{}'", name);
            handle.abort();
        }
    }
}

impl Drop for PollerSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_loop_keeps_ticking_after_failure() {
        // ---
        let count = Arc::new(AtomicUsize::new(0));
        let mut pollers = PollerSet::new();
        let c = count.clone();
        pollers.spawn("flaky", Duration::from_millis(5), move || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    anyhow::bail!("synthetic failure");
                }
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        // Failures on even ticks did not stop the schedule.
        assert!(count.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_ticking() {
        // ---
        let count = Arc::new(AtomicUsize::new(0));
        let mut pollers = PollerSet::new();
        let c = count.clone();
        pollers.spawn("counted", Duration::from_millis(5), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        pollers.shutdown();
        // Let any mid-cycle task finish cancelling before reading.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let frozen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }

    #[tokio::test]
    async fn test_independent_loops_are_isolated() {
        // ---
        let good = Arc::new(AtomicUsize::new(0));
        let mut pollers = PollerSet::new();
        pollers.spawn("always-failing", Duration::from_millis(5), || async {
            anyhow::bail!("down")
        });
        let g = good.clone();
        pollers.spawn("healthy", Duration::from_millis(5), move || {
            let g = g.clone();
            async move {
                g.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(good.load(Ordering::SeqCst) >= 4);
    }
}
