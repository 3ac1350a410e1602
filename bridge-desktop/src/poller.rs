//! Background task that re-reads interface state and reports changes.

use crate::interfaces::{read_snapshot, InterfaceSnapshot};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Running poll loop. Dropping it stops the loop.
pub(crate) struct Poller {
    token: CancellationToken,
}

impl Poller {
    /// Spawns a loop on `runtime` that derives facts from every snapshot and
    /// hands them to `deliver` whenever they differ from the previous ones.
    ///
    /// The first tick fires immediately, so the current facts are delivered
    /// once right after spawning.
    pub(crate) fn spawn<T, D, F>(
        runtime: &Handle,
        label: String,
        root: PathBuf,
        interval: Duration,
        derive: D,
        deliver: F,
    ) -> Self
    where
        T: PartialEq + Clone + Send + 'static,
        D: Fn(&InterfaceSnapshot) -> T + Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last: Option<T> = None;

            debug!(handle = %label, interval = ?interval, "Poller started");

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let snapshot_root = root.clone();
                let snapshot = match tokio::task::spawn_blocking(move || read_snapshot(&snapshot_root)).await {
                    Ok(Ok(snapshot)) => snapshot,
                    Ok(Err(err)) => {
                        warn!(handle = %label, error = %err, "Failed to read interface state");
                        continue;
                    }
                    Err(err) => {
                        warn!(handle = %label, error = %err, "Interface read task failed");
                        continue;
                    }
                };

                let facts = derive(&snapshot);
                if last.as_ref() == Some(&facts) {
                    trace!(handle = %label, "Interface state unchanged");
                    continue;
                }
                last = Some(facts.clone());

                if cancelled.is_cancelled() {
                    break;
                }
                deliver(facts);
            }

            debug!(handle = %label, "Poller stopped");
        });

        Self { token }
    }

    pub(crate) fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{fake, ARPHRD_ETHER};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn any_up(snapshot: &InterfaceSnapshot) -> bool {
        snapshot.interfaces.iter().any(|i| i.is_up)
    }

    #[tokio::test]
    async fn test_poller_delivers_changes_only() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "eth0", "up", ARPHRD_ETHER, false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let poller = Poller::spawn(
            &Handle::current(),
            "test".to_string(),
            dir.path().to_path_buf(),
            Duration::from_millis(10),
            any_up,
            move |up| {
                let _ = tx.send(up);
            },
        );

        assert_eq!(rx.recv().await, Some(true));
        fake::set_operstate(dir.path(), "eth0", "down");
        assert_eq!(rx.recv().await, Some(false));

        drop(poller);
        // The loop drops its sender once it observes the cancellation.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_poller_accepts_very_long_intervals() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "eth0", "up", ARPHRD_ETHER, false);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let poller = Poller::spawn(
            &Handle::current(),
            "test".to_string(),
            dir.path().to_path_buf(),
            Duration::from_secs(365 * 24 * 60 * 60),
            any_up,
            move |up| {
                let _ = tx.send(up);
            },
        );

        assert_eq!(rx.recv().await, Some(true));
        poller.stop();
        assert_eq!(rx.recv().await, None);
    }
}
