//! Process-wide change notification.
//!
//! Every monitor posts [`REACHABILITY_CHANGED`] on its notification center
//! after each detected change. The payload is a weak [`MonitorRef`], so
//! observers that were never handed the monitor can still re-query it.

use crate::error::Result;
use crate::monitor::{Monitor, MonitorId, PathMonitor, Reachability, WeakMonitor};
use crate::source::{FlagsSource, PathSource, Source};
use crate::status::ReachabilityStatus;
use core_runtime::events::{Notification, NotificationCenter, NotificationName, NotificationStream};
use std::sync::OnceLock;

pub const REACHABILITY_CHANGED: NotificationName =
    NotificationName::new("ReachabilityChangedNotification");

pub type ReachabilityNotification = Notification<MonitorRef>;

/// Weak reference to the monitor that posted a notification.
#[derive(Debug, Clone)]
pub enum MonitorRef {
    Flags(WeakMonitor<FlagsSource>),
    Path(WeakMonitor<PathSource>),
}

impl MonitorRef {
    pub fn id(&self) -> MonitorId {
        match self {
            MonitorRef::Flags(monitor) => monitor.id(),
            MonitorRef::Path(monitor) => monitor.id(),
        }
    }

    /// The flags-based monitor, if it posted this and is still alive.
    pub fn flags(&self) -> Option<Reachability> {
        match self {
            MonitorRef::Flags(monitor) => monitor.upgrade(),
            MonitorRef::Path(_) => None,
        }
    }

    /// The path monitor, if it posted this and is still alive.
    pub fn path(&self) -> Option<PathMonitor> {
        match self {
            MonitorRef::Path(monitor) => monitor.upgrade(),
            MonitorRef::Flags(_) => None,
        }
    }

    pub fn refers_to<S: Source>(&self, monitor: &Monitor<S>) -> bool {
        self.id() == monitor.id()
    }

    /// Current status of the posting monitor, `None` once it is released.
    ///
    /// Path connections are reported as their coarse status.
    pub fn current_status(&self) -> Option<Result<ReachabilityStatus>> {
        match self {
            MonitorRef::Flags(monitor) => monitor.upgrade().map(|m| m.current_status()),
            MonitorRef::Path(monitor) => monitor
                .upgrade()
                .map(|m| m.current_status().map(|c| c.reachability_status())),
        }
    }
}

/// The process-wide notification center monitors post to by default.
pub fn default_center() -> NotificationCenter<MonitorRef> {
    static CENTER: OnceLock<NotificationCenter<MonitorRef>> = OnceLock::new();
    CENTER.get_or_init(NotificationCenter::default).clone()
}

/// Observe change notifications on the default center.
pub fn observe_changes() -> NotificationStream<MonitorRef> {
    default_center().observe(REACHABILITY_CHANGED)
}
