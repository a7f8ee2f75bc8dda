//! Background state polling
//!
//! A fixed-interval task that asks the backend for its deployment state and
//! publishes every change through a watch channel. The task is aborted when
//! the handle is cancelled or dropped, so an editor torn down without an
//! explicit cancel does not leave a timer behind.

use crate::backend::TopologyBackend;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use topolab_core::{RunState, TopologyStateResponse};
use tracing::{debug, warn};

/// Handle to a running state poll.
#[derive(Debug)]
pub struct StatePoller {
    task: JoinHandle<()>,
    state: watch::Receiver<Option<TopologyStateResponse>>,
}

impl StatePoller {
    /// Start polling. Must be called inside a tokio runtime.
    pub fn spawn(backend: Arc<dyn TopologyBackend>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match backend.get_topology_state().await {
                    Ok(state) => {
                        let changed = tx.send_if_modified(|current| {
                            if current.as_ref() == Some(&state) {
                                false
                            } else {
                                *current = Some(state);
                                true
                            }
                        });
                        if changed {
                            debug!("topology state changed");
                        }
                    }
                    Err(err) => warn!(error = %err, "state poll failed"),
                }
                if tx.is_closed() {
                    break;
                }
            }
        });
        Self { task, state: rx }
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<Option<TopologyStateResponse>> {
        self.state.clone()
    }

    /// Last state seen, if any poll has succeeded.
    pub fn latest(&self) -> Option<TopologyStateResponse> {
        self.state.borrow().clone()
    }

    /// Run state of the last state seen.
    pub fn run_state(&self) -> Option<RunState> {
        self.state
            .borrow()
            .as_ref()
            .and_then(|state| state.run_state().ok())
    }

    /// Stop polling.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StatePoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
