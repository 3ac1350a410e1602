//! Raw facts to status translation.

use crate::status::{Connection, ReachabilityStatus};
use bridge_traits::{InterfaceType, NetworkPath, ReachabilityFlags};

/// Maps a flags snapshot to a status.
///
/// WWAN wins over WLAN whenever the target is reachable.
pub fn status_from_flags(flags: ReachabilityFlags) -> ReachabilityStatus {
    if !flags.contains(ReachabilityFlags::REACHABLE) {
        return ReachabilityStatus::Unavailable;
    }

    let mut status = ReachabilityStatus::Unavailable;

    if !flags.contains(ReachabilityFlags::CONNECTION_REQUIRED) {
        status = ReachabilityStatus::Wlan;
    }

    let on_traffic_or_demand = flags.intersects(
        ReachabilityFlags::CONNECTION_ON_TRAFFIC | ReachabilityFlags::CONNECTION_ON_DEMAND,
    );
    if on_traffic_or_demand && !flags.contains(ReachabilityFlags::INTERVENTION_REQUIRED) {
        status = ReachabilityStatus::Wlan;
    }

    if flags.contains(ReachabilityFlags::IS_WWAN) {
        status = ReachabilityStatus::Wwan;
    }

    status
}

/// Maps a path descriptor to a connection, preferring wired over Wi-Fi over
/// cellular.
pub fn connection_from_path(path: &NetworkPath) -> Connection {
    if !path.is_satisfied() {
        return Connection::Unavailable;
    }

    const PRIORITY: [(InterfaceType, Connection); 3] = [
        (InterfaceType::WiredEthernet, Connection::WiredEthernet),
        (InterfaceType::Wifi, Connection::Wifi),
        (InterfaceType::Cellular, Connection::Cellular),
    ];

    PRIORITY
        .iter()
        .find(|(interface, _)| path.uses_interface_type(*interface))
        .map(|(_, connection)| *connection)
        .unwrap_or(Connection::Other)
}

/// Adjustments applied after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    /// When false, a cellular result is reported as unavailable.
    pub allows_cellular: bool,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            allows_cellular: true,
        }
    }
}

impl StatusPolicy {
    pub fn apply_status(&self, status: ReachabilityStatus) -> ReachabilityStatus {
        match status {
            ReachabilityStatus::Wwan if !self.allows_cellular => ReachabilityStatus::Unavailable,
            other => other,
        }
    }

    pub fn apply_connection(&self, connection: Connection) -> Connection {
        match connection {
            Connection::Cellular if !self.allows_cellular => Connection::Unavailable,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::PathStatus;

    fn path(status: PathStatus, interfaces: &[InterfaceType]) -> NetworkPath {
        NetworkPath {
            status,
            available_interfaces: interfaces.to_vec(),
            is_expensive: false,
            is_constrained: false,
        }
    }

    #[test]
    fn test_connection_required_without_on_demand_is_unavailable() {
        let flags = ReachabilityFlags::REACHABLE | ReachabilityFlags::CONNECTION_REQUIRED;
        assert_eq!(status_from_flags(flags), ReachabilityStatus::Unavailable);
    }

    #[test]
    fn test_on_demand_upgrades_unless_intervention_required() {
        let on_demand = ReachabilityFlags::REACHABLE
            | ReachabilityFlags::CONNECTION_REQUIRED
            | ReachabilityFlags::CONNECTION_ON_DEMAND;
        assert_eq!(status_from_flags(on_demand), ReachabilityStatus::Wlan);

        let intervention = on_demand | ReachabilityFlags::INTERVENTION_REQUIRED;
        assert_eq!(status_from_flags(intervention), ReachabilityStatus::Unavailable);

        let on_traffic = ReachabilityFlags::REACHABLE
            | ReachabilityFlags::CONNECTION_REQUIRED
            | ReachabilityFlags::CONNECTION_ON_TRAFFIC;
        assert_eq!(status_from_flags(on_traffic), ReachabilityStatus::Wlan);
    }

    #[test]
    fn test_path_priority() {
        let all = [
            InterfaceType::Cellular,
            InterfaceType::Wifi,
            InterfaceType::WiredEthernet,
        ];
        assert_eq!(
            connection_from_path(&path(PathStatus::Satisfied, &all)),
            Connection::WiredEthernet
        );
        assert_eq!(
            connection_from_path(&path(PathStatus::Satisfied, &all[..2])),
            Connection::Wifi
        );
        assert_eq!(
            connection_from_path(&path(PathStatus::Satisfied, &all[..1])),
            Connection::Cellular
        );
        assert_eq!(
            connection_from_path(&path(PathStatus::Satisfied, &[InterfaceType::Other])),
            Connection::Other
        );
        assert_eq!(
            connection_from_path(&path(PathStatus::RequiresConnection, &all)),
            Connection::Unavailable
        );
    }

    #[test]
    fn test_policy_disallowing_cellular() {
        let policy = StatusPolicy {
            allows_cellular: false,
        };
        assert_eq!(
            policy.apply_status(ReachabilityStatus::Wwan),
            ReachabilityStatus::Unavailable
        );
        assert_eq!(policy.apply_status(ReachabilityStatus::Wlan), ReachabilityStatus::Wlan);
        assert_eq!(
            policy.apply_connection(Connection::Cellular),
            Connection::Unavailable
        );
        assert_eq!(
            StatusPolicy::default().apply_status(ReachabilityStatus::Wwan),
            ReachabilityStatus::Wwan
        );
    }
}
