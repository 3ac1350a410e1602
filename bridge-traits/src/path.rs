//! Path-based Network Monitoring Primitive
//!
//! Models the OS facility that reports a full network path descriptor
//! (satisfaction plus the interface types the path can use) instead of a
//! reachability bitset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Whether a path can currently carry traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
    /// Usable once a connection is brought up (e.g. VPN on demand).
    RequiresConnection,
}

/// Interface classes a path may run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceType {
    WiredEthernet,
    Wifi,
    Cellular,
    Loopback,
    Other,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterfaceType::WiredEthernet => "wired",
            InterfaceType::Wifi => "wifi",
            InterfaceType::Cellular => "cellular",
            InterfaceType::Loopback => "loopback",
            InterfaceType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Network path descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPath {
    pub status: PathStatus,
    /// Interface types the path can use, in the order the platform reported them.
    pub available_interfaces: Vec<InterfaceType>,
    /// Whether the path uses an interface the OS considers expensive (cellular, hotspot)
    pub is_expensive: bool,
    /// Whether the path is in a low-data mode
    pub is_constrained: bool,
}

impl NetworkPath {
    pub fn unsatisfied() -> Self {
        Self {
            status: PathStatus::Unsatisfied,
            available_interfaces: Vec::new(),
            is_expensive: false,
            is_constrained: false,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == PathStatus::Satisfied
    }

    pub fn uses_interface_type(&self, interface: InterfaceType) -> bool {
        self.available_interfaces.contains(&interface)
    }
}

/// What a path monitor observes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathTarget {
    /// Any interface.
    General,
    /// Only paths over this interface type.
    Required(InterfaceType),
    /// Any interface except these.
    Prohibited(Vec<InterfaceType>),
}

impl PathTarget {
    /// Whether an interface of type `interface` may carry this target's path.
    pub fn permits(&self, interface: InterfaceType) -> bool {
        match self {
            PathTarget::General => true,
            PathTarget::Required(required) => *required == interface,
            PathTarget::Prohibited(prohibited) => !prohibited.contains(&interface),
        }
    }
}

impl fmt::Display for PathTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTarget::General => f.write_str("any interface"),
            PathTarget::Required(interface) => write!(f, "{interface} only"),
            PathTarget::Prohibited(prohibited) => {
                f.write_str("excluding ")?;
                for (i, interface) in prohibited.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{interface}")?;
                }
                Ok(())
            }
        }
    }
}

/// Update handler installed on a [`PathMonitorHandle`].
pub type PathCallback = Arc<dyn Fn(NetworkPath) + Send + Sync>;

/// Factory for path monitor handles.
pub trait PathMonitorProvider: Send + Sync {
    fn create(&self, target: &PathTarget) -> Result<Box<dyn PathMonitorHandle>>;
}

/// One OS path monitor.
pub trait PathMonitorHandle: Send {
    /// Install the update handler and start delivering paths.
    fn start(&mut self, on_update: PathCallback) -> Result<()>;

    /// Most recent path, `None` until the monitor has evaluated one.
    fn current_path(&self) -> Option<NetworkPath>;

    /// Stop delivering updates. Idempotent.
    fn cancel(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_permits() {
        assert!(PathTarget::General.permits(InterfaceType::Cellular));
        assert!(PathTarget::Required(InterfaceType::Wifi).permits(InterfaceType::Wifi));
        assert!(!PathTarget::Required(InterfaceType::Wifi).permits(InterfaceType::Cellular));

        let prohibited = PathTarget::Prohibited(vec![InterfaceType::Cellular]);
        assert!(!prohibited.permits(InterfaceType::Cellular));
        assert!(prohibited.permits(InterfaceType::WiredEthernet));
    }

    #[test]
    fn test_path_queries() {
        let path = NetworkPath {
            status: PathStatus::Satisfied,
            available_interfaces: vec![InterfaceType::Wifi, InterfaceType::Cellular],
            is_expensive: false,
            is_constrained: false,
        };
        assert!(path.is_satisfied());
        assert!(path.uses_interface_type(InterfaceType::Cellular));
        assert!(!path.uses_interface_type(InterfaceType::WiredEthernet));
        assert!(!NetworkPath::unsatisfied().is_satisfied());
    }

    #[test]
    fn test_prohibited_display() {
        let target = PathTarget::Prohibited(vec![InterfaceType::Cellular, InterfaceType::Other]);
        assert_eq!(target.to_string(), "excluding cellular,other");
    }
}
