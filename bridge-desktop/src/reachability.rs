//! Flags-based reachability over sysfs.

use crate::interfaces::{read_snapshot, validate_target, EINVAL, ENOTSUP};
use crate::poller::Poller;
use crate::DesktopOptions;
use bridge_traits::{
    error::Result, BridgeError, FlagsCallback, ReachabilityFlags, ReachabilityHandle,
    ReachabilityProvider, ReachabilityTarget,
};
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Desktop reachability provider.
///
/// Handles poll the interface directory on the tokio runtime that was current
/// when the provider (or the handle) was created.
#[derive(Debug, Clone)]
pub struct DesktopReachabilityProvider {
    options: DesktopOptions,
    runtime: Option<Handle>,
}

impl DesktopReachabilityProvider {
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

impl Default for DesktopReachabilityProvider {
    fn default() -> Self {
        Self::new(DesktopOptions::default())
    }
}

impl ReachabilityProvider for DesktopReachabilityProvider {
    fn create(&self, target: &ReachabilityTarget) -> Result<Box<dyn ReachabilityHandle>> {
        validate_target(target)?;
        info!(target_desc = %target, "Created desktop reachability handle");

        Ok(Box::new(DesktopReachabilityHandle {
            target: target.clone(),
            options: self.options.clone(),
            runtime: self.runtime.clone().or_else(|| Handle::try_current().ok()),
            callback: None,
            poller: None,
        }))
    }
}

struct DesktopReachabilityHandle {
    target: ReachabilityTarget,
    options: DesktopOptions,
    runtime: Option<Handle>,
    callback: Option<FlagsCallback>,
    poller: Option<Poller>,
}

impl ReachabilityHandle for DesktopReachabilityHandle {
    fn set_callback(&mut self, callback: Option<FlagsCallback>) -> Result<()> {
        if callback.is_none() {
            if let Some(poller) = self.poller.take() {
                poller.stop();
            }
        }
        self.callback = callback;
        Ok(())
    }

    fn schedule_delivery(&mut self) -> Result<()> {
        let callback = self
            .callback
            .clone()
            .ok_or(BridgeError::DeliverySchedulingFailed { code: EINVAL })?;

        let runtime = match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(runtime) => runtime,
            None => return Err(BridgeError::DeliverySchedulingFailed { code: ENOTSUP }),
        };

        let target = self.target.clone();
        self.poller = Some(Poller::spawn(
            &runtime,
            self.target.to_string(),
            self.options.interfaces_root.clone(),
            self.options.poll_interval,
            move |snapshot| snapshot.flags_for(&target),
            move |flags: ReachabilityFlags| callback(flags),
        ));
        debug!(target_desc = %self.target, "Scheduled reachability delivery");
        Ok(())
    }

    fn current_flags(&self) -> Result<ReachabilityFlags> {
        let snapshot = read_snapshot(&self.options.interfaces_root)?;
        Ok(snapshot.flags_for(&self.target))
    }

    fn teardown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
            debug!(target_desc = %self.target, "Tore down reachability handle");
        }
        self.callback = None;
    }
}

impl Drop for DesktopReachabilityHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}
