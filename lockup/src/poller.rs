//! Cancellable periodic refresh.
//!
//! One poller per owner/lockup pair. Cancellation (explicit `stop` or
//! dropping the handle) makes any in-flight or pending poll discard its
//! result silently — a stale snapshot is never applied after the session
//! ends.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::controller::LockupController;

pub struct Poller {
    cancel: broadcast::Sender<()>,
}

impl Poller {
    /// Spawn a background task that refreshes the controller immediately
    /// and then every `interval`. A failed cycle is logged and skipped; the
    /// previous state stays in place until the next cycle.
    pub fn spawn(controller: Arc<LockupController>, interval: Duration) -> Self {
        let (cancel, mut rx) = broadcast::channel(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    // Cancellation mid-fetch drops the refresh future before
                    // its result is applied.
                    _ = rx.recv() => break,
                    result = controller.refresh() => {
                        if let Err(e) = result {
                            tracing::warn!(error = %e, "poll cycle failed, keeping previous state");
                        }
                    }
                }
            }
            tracing::debug!("poller stopped");
        });

        Self { cancel }
    }

    /// Cancel the polling task.
    pub fn stop(&self) {
        let _ = self.cancel.send(());
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.cancel.send(());
    }
}
