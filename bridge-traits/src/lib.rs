//! # Host Bridge Traits
//!
//! Contract between the reachability core and the OS-level primitives it sits on.
//!
//! ## Overview
//!
//! The core never talks to the operating system directly. Each platform ships an
//! implementation of the primitive traits defined here, and the core adapts the
//! single low-level callback those primitives deliver into its consumer-facing
//! notification channels.
//!
//! ## Traits
//!
//! ### Reachability primitives
//! - [`ReachabilityProvider`](reachability::ReachabilityProvider) /
//!   [`ReachabilityHandle`](reachability::ReachabilityHandle) - flags-based
//!   reachability for the default route, a host or an address
//! - [`PathMonitorProvider`](path::PathMonitorProvider) /
//!   [`PathMonitorHandle`](path::PathMonitorHandle) - path descriptors with
//!   interface type information
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Linux    | `bridge-desktop`    | ✅ sysfs polling |
//! | Apple    | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! Every primitive reports failures as a [`BridgeError`](error::BridgeError)
//! carrying the platform's numeric diagnostic code. Handles are expected to
//! fail synchronously at creation when a target cannot be monitored, and to
//! report registration or scheduling refusals from the corresponding call.
//!
//! ## Thread Safety
//!
//! Providers are `Send + Sync` so they can be shared behind `Arc`. Handles are
//! `Send` and owned by exactly one monitor. Callbacks may be invoked from any
//! thread.

pub mod error;
pub mod log;
pub mod path;
pub mod reachability;

pub use error::{BridgeError, ErrorKind};

// Re-export commonly used types
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use path::{
    InterfaceType, NetworkPath, PathCallback, PathMonitorHandle, PathMonitorProvider,
    PathStatus, PathTarget,
};
pub use reachability::{
    FlagsCallback, ReachabilityFlags, ReachabilityHandle, ReachabilityProvider,
    ReachabilityTarget,
};
