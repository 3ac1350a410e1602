//! Checks against the real interface directory of the machine running the tests.

use bridge_desktop::{read_snapshot, DesktopOptions, DesktopReachabilityProvider};
use bridge_traits::{ReachabilityFlags, ReachabilityProvider, ReachabilityTarget};

#[tokio::test]
#[ignore = "requires a Linux host with an active network connection"]
async fn test_general_target_is_reachable() {
    let options = DesktopOptions::default();
    let snapshot = read_snapshot(&options.interfaces_root).unwrap();
    assert!(!snapshot.interfaces.is_empty());

    let provider = DesktopReachabilityProvider::new(options);
    let handle = provider.create(&ReachabilityTarget::General).unwrap();
    let flags = handle.current_flags().unwrap();
    assert!(flags.contains(ReachabilityFlags::REACHABLE), "flags: {flags}");
}
