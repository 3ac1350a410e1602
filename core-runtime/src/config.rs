//! # Core Configuration Module
//!
//! Provides configuration management for reachability monitoring.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding the OS primitives monitors are built on plus the runtime tunables.
//! It enforces fail-fast validation so a host learns about a missing primitive
//! when it configures the core, not when the first monitor is created.
//!
//! ## Required Dependencies
//!
//! - `ReachabilityProvider` - flags-based reachability primitive
//! - `PathMonitorProvider` - path-based monitoring primitive
//!
//! When the `desktop-shims` feature is enabled, the sysfs-backed desktop
//! primitives from `bridge-desktop` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .poll_interval(Duration::from_secs(1))
//!     .allows_cellular(false)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! Tunables can also come from a JSON document:
//!
//! ```ignore
//! let settings: ReachabilitySettings = serde_json::from_str(r#"{"poll_interval_ms": 500}"#)?;
//! let config = CoreConfig::builder().settings(settings).build()?;
//! ```

use crate::error::{Error, Result};
use crate::queue::DeliveryQueue;
use bridge_traits::{PathMonitorProvider, ReachabilityProvider};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default interval at which polling primitives re-evaluate interface state.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default location of the kernel's network interface directory.
pub const DEFAULT_INTERFACES_ROOT: &str = "/sys/class/net";

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Flags-based reachability primitive
    pub reachability_provider: Arc<dyn ReachabilityProvider>,

    /// Path-based monitoring primitive
    pub path_provider: Arc<dyn PathMonitorProvider>,

    /// Queue consumer callbacks run on. `None` selects the process main queue.
    pub delivery_queue: Option<DeliveryQueue>,

    /// Whether a cellular-only connection counts as reachable
    pub allows_cellular: bool,

    /// Re-evaluation interval for polling primitives
    pub poll_interval: Duration,

    /// Interface directory read by the desktop primitives
    pub interfaces_root: PathBuf,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("reachability_provider", &"ReachabilityProvider { ... }")
            .field("path_provider", &"PathMonitorProvider { ... }")
            .field("delivery_queue", &self.delivery_queue)
            .field("allows_cellular", &self.allows_cellular)
            .field("poll_interval", &self.poll_interval)
            .field("interfaces_root", &self.interfaces_root)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Delivery queue monitors built from this config should use.
    pub fn delivery_queue(&self) -> DeliveryQueue {
        self.delivery_queue.clone().unwrap_or_else(DeliveryQueue::main)
    }
}

/// Serializable subset of the configuration.
///
/// Every field is optional so hosts only need to spell out what they change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilitySettings {
    pub allows_cellular: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub interfaces_root: Option<PathBuf>,
}

impl ReachabilitySettings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid reachability settings: {}", e)))
    }
}

fn validate_poll_interval(interval: Duration) -> Result<()> {
    if interval < MIN_POLL_INTERVAL {
        return Err(Error::PollIntervalTooShort {
            requested: interval,
            minimum: MIN_POLL_INTERVAL,
        });
    }
    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn reachability_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "ReachabilityProvider".to_string(),
        message: "A flags-based reachability primitive is required. \
                 Desktop: enable the 'desktop-shims' feature to use the sysfs provider. \
                 Mobile: inject the platform reachability adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn path_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PathMonitorProvider".to_string(),
        message: "A path monitoring primitive is required. \
                 Desktop: enable the 'desktop-shims' feature to use the sysfs provider. \
                 Mobile: inject the platform path monitor adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn desktop_options(poll_interval: Duration, interfaces_root: &std::path::Path) -> bridge_desktop::DesktopOptions {
    bridge_desktop::DesktopOptions {
        poll_interval,
        interfaces_root: interfaces_root.to_path_buf(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_reachability_provider(
    poll_interval: Duration,
    interfaces_root: &std::path::Path,
) -> Result<Arc<dyn ReachabilityProvider>> {
    use bridge_desktop::DesktopReachabilityProvider;

    let provider: Arc<dyn ReachabilityProvider> = Arc::new(DesktopReachabilityProvider::new(
        desktop_options(poll_interval, interfaces_root),
    ));
    Ok(provider)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_reachability_provider(
    _poll_interval: Duration,
    _interfaces_root: &std::path::Path,
) -> Result<Arc<dyn ReachabilityProvider>> {
    Err(reachability_provider_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_path_provider(
    poll_interval: Duration,
    interfaces_root: &std::path::Path,
) -> Result<Arc<dyn PathMonitorProvider>> {
    use bridge_desktop::DesktopPathMonitorProvider;

    let provider: Arc<dyn PathMonitorProvider> = Arc::new(DesktopPathMonitorProvider::new(
        desktop_options(poll_interval, interfaces_root),
    ));
    Ok(provider)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_path_provider(
    _poll_interval: Duration,
    _interfaces_root: &std::path::Path,
) -> Result<Arc<dyn PathMonitorProvider>> {
    Err(path_provider_missing_error())
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    reachability_provider: Option<Arc<dyn ReachabilityProvider>>,
    path_provider: Option<Arc<dyn PathMonitorProvider>>,
    delivery_queue: Option<DeliveryQueue>,
    allows_cellular: Option<bool>,
    poll_interval: Option<Duration>,
    interfaces_root: Option<PathBuf>,
}

impl CoreConfigBuilder {
    pub fn reachability_provider(mut self, provider: Arc<dyn ReachabilityProvider>) -> Self {
        self.reachability_provider = Some(provider);
        self
    }

    pub fn path_provider(mut self, provider: Arc<dyn PathMonitorProvider>) -> Self {
        self.path_provider = Some(provider);
        self
    }

    /// Queue consumer callbacks are dispatched on.
    ///
    /// Default: the process main queue.
    pub fn delivery_queue(mut self, queue: DeliveryQueue) -> Self {
        self.delivery_queue = Some(queue);
        self
    }

    /// Default: `true`
    pub fn allows_cellular(mut self, allows: bool) -> Self {
        self.allows_cellular = Some(allows);
        self
    }

    /// Default: 2 seconds. Must be at least 50ms.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Default: `/sys/class/net`
    pub fn interfaces_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.interfaces_root = Some(path.into());
        self
    }

    /// Applies every field set in `settings`, overriding earlier calls.
    pub fn settings(mut self, settings: ReachabilitySettings) -> Self {
        if let Some(allows) = settings.allows_cellular {
            self.allows_cellular = Some(allows);
        }
        if let Some(ms) = settings.poll_interval_ms {
            self.poll_interval = Some(Duration::from_millis(ms));
        }
        if let Some(root) = settings.interfaces_root {
            self.interfaces_root = Some(root);
        }
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::PollIntervalTooShort`] if the poll interval is below [`MIN_POLL_INTERVAL`]
    /// - [`Error::Config`] if the interfaces root is empty
    /// - [`Error::CapabilityMissing`] if a primitive is missing and no desktop
    ///   default is available
    pub fn build(self) -> Result<CoreConfig> {
        let poll_interval = self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        validate_poll_interval(poll_interval)?;

        let interfaces_root = self
            .interfaces_root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERFACES_ROOT));
        if interfaces_root.as_os_str().is_empty() {
            return Err(Error::Config(
                "Interfaces root cannot be empty".to_string(),
            ));
        }

        let reachability_provider = match self.reachability_provider {
            Some(provider) => provider,
            None => provide_default_reachability_provider(poll_interval, &interfaces_root)?,
        };

        let path_provider = match self.path_provider {
            Some(provider) => provider,
            None => provide_default_path_provider(poll_interval, &interfaces_root)?,
        };

        Ok(CoreConfig {
            reachability_provider,
            path_provider,
            delivery_queue: self.delivery_queue,
            allows_cellular: self.allows_cellular.unwrap_or(true),
            poll_interval,
            interfaces_root,
        })
    }
}
