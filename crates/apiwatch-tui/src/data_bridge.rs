//! Data bridge: connects the [`Dashboard`] to TUI actions.
//!
//! Two background tasks. One forwards every published
//! [`DashboardState`](apiwatch_core::DashboardState) snapshot as
//! [`Action::StateUpdated`]; the other probes the service's health
//! endpoint and reports the connection state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use apiwatch_core::Dashboard;

use crate::action::Action;

/// Forward dashboard state changes until cancelled or the dashboard is gone.
pub async fn spawn_data_bridge(
    dashboard: Dashboard,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut state = dashboard.subscribe();

    // Initial snapshot so the screen has something before the first refresh
    let snapshot = Arc::new(state.borrow_and_update().clone());
    let _ = action_tx.send(Action::StateUpdated(snapshot));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = state.changed() => {
                if changed.is_err() {
                    debug!("dashboard state channel closed");
                    break;
                }
                let snapshot = Arc::new(state.borrow_and_update().clone());
                if action_tx.send(Action::StateUpdated(snapshot)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge stopped");
}

/// Probe `/health` every `period` and report transitions.
pub async fn spawn_health_probe(
    dashboard: Dashboard,
    period: Duration,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_up: Option<bool> = None;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            _ = interval.tick() => {
                let (up, action) = match dashboard.client().health().await {
                    Ok(true) => (true, Action::Connected),
                    Ok(false) => (false, Action::Disconnected("service reports unhealthy".into())),
                    Err(e) => (false, Action::Disconnected(e.to_string())),
                };
                if last_up != Some(up) {
                    if up {
                        debug!("service reachable");
                    } else {
                        warn!("service unreachable");
                    }
                    last_up = Some(up);
                }
                if action_tx.send(action).is_err() {
                    break;
                }
            }
        }
    }
}
