// ── Periodic refresh ──
//
// One task per poll. Each tick spawns its refresh into a `JoinSet`, so a
// slow response never delays the next tick; the set aborts whatever is
// still running when the poll stops.

use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dashboard::Dashboard;

/// `tokio::time::interval` rejects a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Handle to a running poll. Dropping it stops the timer.
#[must_use = "polling stops as soon as the handle is dropped"]
pub struct PollHandle {
    cancel: CancellationToken,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// `false` once stopped, dropped, or replaced by a newer poll.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            warn!(error = %e, "poll task ended abnormally");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn spawn(dashboard: Dashboard, period: Duration, cancel: CancellationToken) -> PollHandle {
    let period = period.max(MIN_PERIOD);
    let task = tokio::spawn(poll_task(dashboard, period, cancel.clone()));
    PollHandle {
        cancel,
        period,
        task: Some(task),
    }
}

async fn poll_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut refreshes = JoinSet::new();
    debug!(?period, "polling started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                while refreshes.try_join_next().is_some() {}
                let dashboard = dashboard.clone();
                refreshes.spawn(async move {
                    if let Err(e) = dashboard.refresh().await {
                        warn!(error = %e, "periodic refresh failed");
                    }
                });
            }
        }
    }

    refreshes.abort_all();
    debug!("polling stopped");
}
