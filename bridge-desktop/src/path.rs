//! Path monitoring over sysfs.

use crate::interfaces::{read_snapshot, ENOTSUP};
use crate::poller::Poller;
use crate::DesktopOptions;
use bridge_traits::{
    error::Result, BridgeError, NetworkPath, PathCallback, PathMonitorHandle,
    PathMonitorProvider, PathTarget,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Desktop path monitor provider.
#[derive(Debug, Clone)]
pub struct DesktopPathMonitorProvider {
    options: DesktopOptions,
    runtime: Option<Handle>,
}

impl DesktopPathMonitorProvider {
    pub fn new(options: DesktopOptions) -> Self {
        Self {
            options,
            runtime: Handle::try_current().ok(),
        }
    }

    /// Run poll loops on `runtime` instead of the ambient one.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl Default for DesktopPathMonitorProvider {
    fn default() -> Self {
        Self::new(DesktopOptions::default())
    }
}

impl PathMonitorProvider for DesktopPathMonitorProvider {
    fn create(&self, target: &PathTarget) -> Result<Box<dyn PathMonitorHandle>> {
        info!(path_target = %target, "Created desktop path monitor");
        Ok(Box::new(DesktopPathMonitorHandle {
            target: target.clone(),
            options: self.options.clone(),
            runtime: self.runtime.clone().or_else(|| Handle::try_current().ok()),
            latest: Arc::new(Mutex::new(None)),
            poller: None,
        }))
    }
}

struct DesktopPathMonitorHandle {
    target: PathTarget,
    options: DesktopOptions,
    runtime: Option<Handle>,
    latest: Arc<Mutex<Option<NetworkPath>>>,
    poller: Option<Poller>,
}

impl PathMonitorHandle for DesktopPathMonitorHandle {
    fn start(&mut self, on_update: PathCallback) -> Result<()> {
        let runtime = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(BridgeError::DeliverySchedulingFailed { code: ENOTSUP })?;

        // Seed the current path so it can be queried before the first poll.
        match read_snapshot(&self.options.interfaces_root) {
            Ok(snapshot) => *self.latest.lock() = Some(snapshot.path_for(&self.target)),
            Err(err) => warn!(path_target = %self.target, error = %err, "Initial path read failed"),
        }

        let target = self.target.clone();
        let latest = Arc::clone(&self.latest);
        self.poller = Some(Poller::spawn(
            &runtime,
            self.target.to_string(),
            self.options.interfaces_root.clone(),
            self.options.poll_interval,
            move |snapshot| snapshot.path_for(&target),
            move |path: NetworkPath| {
                *latest.lock() = Some(path.clone());
                on_update(path);
            },
        ));
        debug!(path_target = %self.target, "Started path monitor");
        Ok(())
    }

    fn current_path(&self) -> Option<NetworkPath> {
        self.latest.lock().clone()
    }

    fn cancel(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
            debug!(path_target = %self.target, "Cancelled path monitor");
        }
    }
}

impl Drop for DesktopPathMonitorHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
