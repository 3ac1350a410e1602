//! # Desktop Bridge Implementations
//!
//! Default implementations of the reachability primitives for Linux desktops.
//!
//! ## Overview
//!
//! Both primitives read the kernel's network class directory
//! (`/sys/class/net`) and derive their raw facts from the interfaces that are
//! currently up:
//! - `DesktopReachabilityProvider` - flags-based reachability
//! - `DesktopPathMonitorProvider` - path descriptors with interface types
//!
//! Callbacks are delivered from a background tokio task that re-reads the
//! directory every `poll_interval` and only reports facts that changed. Host
//! names are validated but never resolved.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopOptions, DesktopReachabilityProvider};
//! use bridge_traits::{ReachabilityProvider, ReachabilityTarget};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = DesktopReachabilityProvider::new(DesktopOptions::default());
//!     let handle = provider.create(&ReachabilityTarget::General).unwrap();
//!     println!("{}", handle.current_flags().unwrap());
//! }
//! ```

mod interfaces;
mod path;
mod poller;
mod reachability;

use std::path::PathBuf;
use std::time::Duration;

pub use interfaces::{read_snapshot, InterfaceInfo, InterfaceSnapshot};
pub use path::DesktopPathMonitorProvider;
pub use reachability::DesktopReachabilityProvider;

/// Tunables shared by both desktop primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopOptions {
    pub poll_interval: Duration,
    pub interfaces_root: PathBuf,
}

impl Default for DesktopOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            interfaces_root: PathBuf::from("/sys/class/net"),
        }
    }
}
