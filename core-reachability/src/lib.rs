//! # Reachability Core
//!
//! Turns the single low-level callback of an OS reachability primitive into
//! de-duplicated status notifications on several channels.
//!
//! ## Overview
//!
//! A [`Monitor`] owns one primitive handle and reports a small status enum
//! derived from the primitive's raw facts. Every change is delivered through:
//! - an update handler and `when_reachable` / `when_unreachable` closures
//! - a weakly held [`ReachabilityDelegate`]
//! - the [`REACHABILITY_CHANGED`] notification on a process-wide center
//! - [`StatusStream`]s with newest-one buffering
//! - demand-driven [`Subscription`]s
//!
//! Closures, delegate, subjects and the notification run on the monitor's
//! [`DeliveryQueue`](core_runtime::queue::DeliveryQueue), in that order.
//! Streams are fed synchronously when the change is detected.
//!
//! ## Components
//!
//! - **Translators** (`translate`): raw flags or path descriptors to status
//! - **Status Holder** (`holder`): the single de-duplication point
//! - **Sources** (`source`): adapters over the flags and path primitives
//! - **Monitor** (`monitor`): registration, change detection, fan-out, teardown
//! - **Channel adapters** (`stream`, `publisher`, `query`, `notification`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_reachability::{Reachability, ReachabilityStatus};
//!
//! let monitor = Reachability::builder(provider, ReachabilityTarget::General)
//!     .when_reachable(|m| println!("online: {:?}", m.current_status()))
//!     .when_unreachable(|_| println!("offline"))
//!     .build()?;
//!
//! let status = monitor.current_status()?;
//! ```

pub mod delegate;
pub mod error;
pub mod holder;
pub mod monitor;
pub mod notification;
pub mod publisher;
pub mod query;
pub mod source;
pub mod status;
pub mod stream;
pub mod translate;

pub use delegate::ReachabilityDelegate;
pub use error::{ReachabilityError, Result};
pub use holder::StatusHolder;
pub use monitor::{
    Monitor, MonitorBuilder, MonitorCallback, MonitorId, MonitorOptions, PathMonitor,
    Reachability, StatusUpdate, UpdateHandler, WeakMonitor,
};
pub use notification::{
    default_center, observe_changes, MonitorRef, ReachabilityNotification, REACHABILITY_CHANGED,
};
pub use publisher::{sink, Completion, Demand, Sink, StatusPublisher, Subscriber, Subscription};
pub use source::{FactsCallback, FlagsSource, PathSource, Source, SourceFactory};
pub use status::{Connection, Reachable, ReachabilityStatus};
pub use stream::StatusStream;
pub use translate::{connection_from_path, status_from_flags, StatusPolicy};
