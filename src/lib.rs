//! Workspace facade crate.
//!
//! Re-exports the reachability core together with the primitive contracts and
//! runtime plumbing it is built on, so hosts can depend on `reachability`
//! alone. The `desktop-shims` feature (on by default) adds the Linux sysfs
//! primitives and lets [`CoreConfig`](runtime::config::CoreConfig) fall back
//! to them when no primitive is injected.

pub use bridge_traits as bridge;
pub use core_reachability::*;
pub use core_runtime as runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
