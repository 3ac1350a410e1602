//! Interface snapshots read from the kernel's network class directory.
//!
//! Each entry under the root (normally `/sys/class/net`) is one interface. The
//! files read per interface are `operstate`, `carrier` and `type`, plus the
//! presence of a `wireless` or `phy80211` entry for Wi-Fi adapters.

use bridge_traits::{
    BridgeError, InterfaceType, NetworkPath, PathStatus, PathTarget, ReachabilityFlags,
    ReachabilityTarget,
};
use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::Path;

pub(crate) const EINVAL: i32 = 22;
pub(crate) const ENOTSUP: i32 = 95;

/// ARPHRD values from `if_arp.h`.
pub(crate) const ARPHRD_ETHER: u32 = 1;
const ARPHRD_LOOPBACK: u32 = 772;
const ARPHRD_RAWIP: u32 = 519;

const MAX_HOST_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub kind: InterfaceType,
    pub is_up: bool,
}

/// Interfaces present at one instant, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    pub interfaces: Vec<InterfaceInfo>,
}

impl InterfaceSnapshot {
    fn usable(&self) -> impl Iterator<Item = &InterfaceInfo> {
        self.interfaces.iter().filter(|iface| iface.is_up)
    }

    fn loopback_up(&self) -> bool {
        self.usable().any(|iface| iface.kind == InterfaceType::Loopback)
    }

    /// Flags for `target` derived from this snapshot.
    ///
    /// Host names are not resolved: a host is reachable whenever the default
    /// route would be.
    pub fn flags_for(&self, target: &ReachabilityTarget) -> ReachabilityFlags {
        match target {
            ReachabilityTarget::Address(addr) if addr.ip().is_loopback() => {
                if self.loopback_up() {
                    ReachabilityFlags::REACHABLE
                        | ReachabilityFlags::IS_LOCAL_ADDRESS
                        | ReachabilityFlags::IS_DIRECT
                } else {
                    ReachabilityFlags::empty()
                }
            }
            ReachabilityTarget::Address(addr) => {
                let mut flags = self.external_flags();
                if flags.contains(ReachabilityFlags::REACHABLE) && is_link_local(addr.ip()) {
                    flags.insert(ReachabilityFlags::IS_DIRECT);
                }
                flags
            }
            ReachabilityTarget::General | ReachabilityTarget::Host(_) => self.external_flags(),
        }
    }

    fn external_flags(&self) -> ReachabilityFlags {
        let external: Vec<&InterfaceInfo> = self
            .usable()
            .filter(|iface| iface.kind != InterfaceType::Loopback)
            .collect();

        if external.is_empty() {
            return ReachabilityFlags::empty();
        }

        let mut flags = ReachabilityFlags::REACHABLE;
        if external.iter().all(|iface| iface.kind == InterfaceType::Cellular) {
            flags.insert(ReachabilityFlags::IS_WWAN);
        }
        flags
    }

    /// Path descriptor for `target` derived from this snapshot.
    pub fn path_for(&self, target: &PathTarget) -> NetworkPath {
        let wants_loopback = *target == PathTarget::Required(InterfaceType::Loopback);

        let mut available = Vec::new();
        for iface in self.usable() {
            if iface.kind == InterfaceType::Loopback && !wants_loopback {
                continue;
            }
            if target.permits(iface.kind) && !available.contains(&iface.kind) {
                available.push(iface.kind);
            }
        }

        if available.is_empty() {
            return NetworkPath::unsatisfied();
        }

        NetworkPath {
            status: PathStatus::Satisfied,
            is_expensive: available.contains(&InterfaceType::Cellular),
            is_constrained: false,
            available_interfaces: available,
        }
    }
}

fn is_link_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn io_code(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(-1)
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn classify(name: &str, dir: &Path, arp_type: Option<u32>) -> InterfaceType {
    if dir.join("wireless").exists() || dir.join("phy80211").exists() {
        return InterfaceType::Wifi;
    }
    if name.starts_with("wwan") || arp_type == Some(ARPHRD_RAWIP) {
        return InterfaceType::Cellular;
    }
    if name == "lo" || arp_type == Some(ARPHRD_LOOPBACK) {
        return InterfaceType::Loopback;
    }
    if arp_type == Some(ARPHRD_ETHER) {
        return InterfaceType::WiredEthernet;
    }
    InterfaceType::Other
}

/// Reads every interface under `root`.
///
/// # Errors
///
/// Returns [`BridgeError::FactsQueryFailed`] with the OS error code if the
/// directory cannot be listed.
pub fn read_snapshot(root: &Path) -> Result<InterfaceSnapshot, BridgeError> {
    let entries = fs::read_dir(root).map_err(|e| BridgeError::FactsQueryFailed { code: io_code(&e) })?;

    let mut interfaces = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BridgeError::FactsQueryFailed { code: io_code(&e) })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let dir = entry.path();

        let operstate = read_trimmed(&dir.join("operstate")).unwrap_or_default();
        let carrier = read_trimmed(&dir.join("carrier"));
        let arp_type = read_trimmed(&dir.join("type")).and_then(|t| t.parse::<u32>().ok());

        let is_up = operstate == "up" || (operstate == "unknown" && carrier.as_deref() == Some("1"));

        interfaces.push(InterfaceInfo {
            kind: classify(&name, &dir, arp_type),
            name,
            is_up,
        });
    }

    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(InterfaceSnapshot { interfaces })
}

/// Rejects host names that can never be monitored.
pub(crate) fn validate_target(target: &ReachabilityTarget) -> Result<(), BridgeError> {
    let ReachabilityTarget::Host(name) = target else {
        return Ok(());
    };

    let invalid = || BridgeError::CreationFailed {
        target: target.to_string(),
        code: EINVAL,
    };

    if name.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() || trimmed.len() > MAX_HOST_LEN {
        return Err(invalid());
    }

    for label in trimmed.split('.') {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(invalid());
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fake {
    use std::fs;
    use std::path::Path;

    /// Writes a fake interface directory under `root`.
    pub fn interface(root: &Path, name: &str, operstate: &str, arp_type: u32, wireless: bool) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), format!("{operstate}\n")).unwrap();
        fs::write(dir.join("type"), format!("{arp_type}\n")).unwrap();
        let carrier = if operstate == "down" { "0" } else { "1" };
        fs::write(dir.join("carrier"), format!("{carrier}\n")).unwrap();
        if wireless {
            fs::create_dir_all(dir.join("wireless")).unwrap();
        }
    }

    pub fn set_operstate(root: &Path, name: &str, operstate: &str) {
        fs::write(root.join(name).join("operstate"), format!("{operstate}\n")).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::fake;
    use super::*;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    fn host(name: &str) -> ReachabilityTarget {
        ReachabilityTarget::Host(name.to_string())
    }

    fn addr(s: &str) -> ReachabilityTarget {
        ReachabilityTarget::Address(s.parse::<SocketAddr>().unwrap())
    }

    #[test]
    fn test_read_snapshot_classifies_interfaces() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "lo", "unknown", ARPHRD_LOOPBACK, false);
        fake::interface(dir.path(), "eth0", "up", ARPHRD_ETHER, false);
        fake::interface(dir.path(), "wlan0", "down", ARPHRD_ETHER, true);
        fake::interface(dir.path(), "wwan0", "up", ARPHRD_RAWIP, false);
        fake::interface(dir.path(), "tun0", "unknown", 65534, false);

        let snapshot = read_snapshot(dir.path()).unwrap();
        let kinds: Vec<_> = snapshot
            .interfaces
            .iter()
            .map(|i| (i.name.as_str(), i.kind, i.is_up))
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("eth0", InterfaceType::WiredEthernet, true),
                ("lo", InterfaceType::Loopback, true),
                ("tun0", InterfaceType::Other, true),
                ("wlan0", InterfaceType::Wifi, false),
                ("wwan0", InterfaceType::Cellular, true),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_facts_query_failure() {
        let dir = TempDir::new().unwrap();
        let err = read_snapshot(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, BridgeError::FactsQueryFailed { code } if code != 0));
    }

    #[test]
    fn test_flags_loopback_only_is_unreachable() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "lo", "unknown", ARPHRD_LOOPBACK, false);
        let snapshot = read_snapshot(dir.path()).unwrap();

        assert!(snapshot.flags_for(&ReachabilityTarget::General).is_empty());
        assert_eq!(
            snapshot.flags_for(&addr("127.0.0.1:80")),
            ReachabilityFlags::REACHABLE
                | ReachabilityFlags::IS_LOCAL_ADDRESS
                | ReachabilityFlags::IS_DIRECT
        );
    }

    #[test]
    fn test_flags_cellular_only_sets_wwan() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "wwan0", "up", ARPHRD_RAWIP, false);
        let snapshot = read_snapshot(dir.path()).unwrap();

        let flags = snapshot.flags_for(&host("example.com"));
        assert!(flags.contains(ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN));

        fake::interface(dir.path(), "eth0", "up", ARPHRD_ETHER, false);
        let snapshot = read_snapshot(dir.path()).unwrap();
        let flags = snapshot.flags_for(&ReachabilityTarget::General);
        assert!(flags.contains(ReachabilityFlags::REACHABLE));
        assert!(!flags.contains(ReachabilityFlags::IS_WWAN));
    }

    #[test]
    fn test_flags_link_local_is_direct() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "eth0", "up", ARPHRD_ETHER, false);
        let snapshot = read_snapshot(dir.path()).unwrap();

        assert!(snapshot
            .flags_for(&addr("169.254.1.1:80"))
            .contains(ReachabilityFlags::IS_DIRECT));
        assert!(snapshot
            .flags_for(&addr("[fe80::1]:80"))
            .contains(ReachabilityFlags::IS_DIRECT));
        assert!(!snapshot
            .flags_for(&addr("93.184.216.34:443"))
            .contains(ReachabilityFlags::IS_DIRECT));
    }

    #[test]
    fn test_path_respects_target() {
        let dir = TempDir::new().unwrap();
        fake::interface(dir.path(), "lo", "unknown", ARPHRD_LOOPBACK, false);
        fake::interface(dir.path(), "wlan0", "up", ARPHRD_ETHER, true);
        fake::interface(dir.path(), "wwan0", "up", ARPHRD_RAWIP, false);
        let snapshot = read_snapshot(dir.path()).unwrap();

        let general = snapshot.path_for(&PathTarget::General);
        assert!(general.is_satisfied());
        assert_eq!(
            general.available_interfaces,
            vec![InterfaceType::Wifi, InterfaceType::Cellular]
        );
        assert!(general.is_expensive);

        let no_cell = snapshot.path_for(&PathTarget::Prohibited(vec![InterfaceType::Cellular]));
        assert_eq!(no_cell.available_interfaces, vec![InterfaceType::Wifi]);
        assert!(!no_cell.is_expensive);

        let wired = snapshot.path_for(&PathTarget::Required(InterfaceType::WiredEthernet));
        assert_eq!(wired, NetworkPath::unsatisfied());

        let lo = snapshot.path_for(&PathTarget::Required(InterfaceType::Loopback));
        assert_eq!(lo.available_interfaces, vec![InterfaceType::Loopback]);
    }

    #[test]
    fn test_validate_host_names() {
        assert!(validate_target(&host("example.com")).is_ok());
        assert!(validate_target(&host("example.com.")).is_ok());
        assert!(validate_target(&host("10.0.0.1")).is_ok());
        assert!(validate_target(&host("::1")).is_ok());
        assert!(validate_target(&ReachabilityTarget::General).is_ok());

        let long_label = format!("{}.com", "x".repeat(64));
        for bad in ["", ".", "exa mple.com", "-bad.com", "a..b", long_label.as_str()] {
            let err = validate_target(&host(bad)).unwrap_err();
            assert!(
                matches!(err, BridgeError::CreationFailed { code: EINVAL, .. }),
                "{bad:?} should be rejected"
            );
        }
    }
}
