//! Adapters over the two OS primitives.
//!
//! A [`Source`] owns exactly one primitive handle and exposes the operations a
//! monitor needs: install its single callback, query the current facts, and
//! tear the handle down.

use crate::monitor::WeakMonitor;
use crate::notification::MonitorRef;
use crate::status::{Connection, Reachable, ReachabilityStatus};
use crate::translate::{connection_from_path, status_from_flags, StatusPolicy};
use bridge_traits::{
    BridgeError, NetworkPath, PathMonitorHandle, PathMonitorProvider, PathTarget,
    ReachabilityFlags, ReachabilityHandle, ReachabilityProvider, ReachabilityTarget,
};
use std::fmt;
use std::sync::Arc;

/// Callback a source invokes with fresh facts.
pub type FactsCallback<F> = Arc<dyn Fn(F) + Send + Sync>;

/// Creates a fresh source. Called once per monitor.
pub type SourceFactory<S> = Arc<dyn Fn() -> Result<S, BridgeError> + Send + Sync>;

pub trait Source: Send + 'static {
    type Facts: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Status: Reachable;

    /// Short description of the monitored target for logs.
    fn describe(&self) -> String;

    /// Installs the single low-level callback and starts delivery.
    fn install(&mut self, on_facts: FactsCallback<Self::Facts>) -> Result<(), BridgeError>;

    /// Synchronous point query. `None` means the primitive has nothing yet.
    fn current_facts(&self) -> Result<Option<Self::Facts>, BridgeError>;

    /// Unregisters the callback and stops delivery. Idempotent.
    fn teardown(&mut self);

    fn status(facts: Option<&Self::Facts>, policy: &StatusPolicy) -> Self::Status;

    fn notification_ref(monitor: WeakMonitor<Self>) -> MonitorRef
    where
        Self: Sized;
}

/// Flags-based source.
pub struct FlagsSource {
    target: ReachabilityTarget,
    handle: Box<dyn ReachabilityHandle>,
}

impl FlagsSource {
    pub fn new(
        provider: &dyn ReachabilityProvider,
        target: ReachabilityTarget,
    ) -> Result<Self, BridgeError> {
        let handle = provider.create(&target)?;
        Ok(Self { target, handle })
    }

    pub fn factory(
        provider: Arc<dyn ReachabilityProvider>,
        target: ReachabilityTarget,
    ) -> SourceFactory<Self> {
        Arc::new(move || Self::new(provider.as_ref(), target.clone()))
    }

    pub fn target(&self) -> &ReachabilityTarget {
        &self.target
    }
}

impl Source for FlagsSource {
    type Facts = ReachabilityFlags;
    type Status = ReachabilityStatus;

    fn describe(&self) -> String {
        self.target.to_string()
    }

    fn install(&mut self, on_facts: FactsCallback<ReachabilityFlags>) -> Result<(), BridgeError> {
        self.handle.set_callback(Some(on_facts))?;
        if let Err(err) = self.handle.schedule_delivery() {
            let _ = self.handle.set_callback(None);
            return Err(err);
        }
        Ok(())
    }

    fn current_facts(&self) -> Result<Option<ReachabilityFlags>, BridgeError> {
        self.handle.current_flags().map(Some)
    }

    fn teardown(&mut self) {
        self.handle.teardown();
    }

    fn status(facts: Option<&ReachabilityFlags>, policy: &StatusPolicy) -> ReachabilityStatus {
        match facts {
            Some(flags) => policy.apply_status(status_from_flags(*flags)),
            None => ReachabilityStatus::Unknown,
        }
    }

    fn notification_ref(monitor: WeakMonitor<Self>) -> MonitorRef {
        MonitorRef::Flags(monitor)
    }
}

/// Path-based source.
pub struct PathSource {
    target: PathTarget,
    handle: Box<dyn PathMonitorHandle>,
}

impl PathSource {
    pub fn new(provider: &dyn PathMonitorProvider, target: PathTarget) -> Result<Self, BridgeError> {
        let handle = provider.create(&target)?;
        Ok(Self { target, handle })
    }

    pub fn factory(provider: Arc<dyn PathMonitorProvider>, target: PathTarget) -> SourceFactory<Self> {
        Arc::new(move || Self::new(provider.as_ref(), target.clone()))
    }

    pub fn target(&self) -> &PathTarget {
        &self.target
    }
}

impl Source for PathSource {
    type Facts = NetworkPath;
    type Status = Connection;

    fn describe(&self) -> String {
        format!("path over {}", self.target)
    }

    fn install(&mut self, on_facts: FactsCallback<NetworkPath>) -> Result<(), BridgeError> {
        self.handle.start(on_facts)
    }

    fn current_facts(&self) -> Result<Option<NetworkPath>, BridgeError> {
        Ok(self.handle.current_path())
    }

    fn teardown(&mut self) {
        self.handle.cancel();
    }

    fn status(facts: Option<&NetworkPath>, policy: &StatusPolicy) -> Connection {
        match facts {
            Some(path) => policy.apply_connection(connection_from_path(path)),
            None => Connection::Unknown,
        }
    }

    fn notification_ref(monitor: WeakMonitor<Self>) -> MonitorRef {
        MonitorRef::Path(monitor)
    }
}
