//! Consumer-facing status values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status values a monitor can report.
pub trait Reachable: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn is_reachable(&self) -> bool;
}

/// Reachability of a flags-monitored target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReachabilityStatus {
    /// Not determined yet.
    #[default]
    Unknown,
    /// Determined and offline.
    Unavailable,
    /// Reachable over a cellular network.
    Wwan,
    /// Reachable over a local network.
    Wlan,
}

impl ReachabilityStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ReachabilityStatus::Wwan | ReachabilityStatus::Wlan)
    }
}

impl Reachable for ReachabilityStatus {
    fn is_reachable(&self) -> bool {
        ReachabilityStatus::is_reachable(self)
    }
}

impl fmt::Display for ReachabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ReachabilityStatus::Unknown => "Unknown",
            ReachabilityStatus::Unavailable => "No Connection",
            ReachabilityStatus::Wwan => "Cellular",
            ReachabilityStatus::Wlan => "WiFi",
        };
        f.write_str(description)
    }
}

/// Connection category of a path-monitored target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connection {
    #[default]
    Unknown,
    Unavailable,
    WiredEthernet,
    Wifi,
    Cellular,
    /// Satisfied over an interface that is none of the above.
    Other,
}

impl Connection {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Connection::Unknown | Connection::Unavailable)
    }

    /// Coarse status for code that only distinguishes cellular from local.
    pub fn reachability_status(&self) -> ReachabilityStatus {
        match self {
            Connection::Unknown => ReachabilityStatus::Unknown,
            Connection::Unavailable => ReachabilityStatus::Unavailable,
            Connection::Cellular => ReachabilityStatus::Wwan,
            Connection::WiredEthernet | Connection::Wifi | Connection::Other => {
                ReachabilityStatus::Wlan
            }
        }
    }
}

impl Reachable for Connection {
    fn is_reachable(&self) -> bool {
        Connection::is_reachable(self)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Connection::Unknown => "Unknown",
            Connection::Unavailable => "No Connection",
            Connection::WiredEthernet => "Wired Ethernet",
            Connection::Wifi => "WiFi",
            Connection::Cellular => "Cellular",
            Connection::Other => "Other",
        };
        f.write_str(description)
    }
}
