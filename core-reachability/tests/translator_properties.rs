use bridge_traits::{
    BridgeError, InterfaceType, NetworkPath, PathStatus, ReachabilityFlags,
};
use core_reachability::{
    connection_from_path, status_from_flags, Connection, ReachabilityStatus, StatusHolder,
    StatusPolicy,
};
use proptest::prelude::*;

fn any_flags() -> impl Strategy<Value = ReachabilityFlags> {
    // Bits 0..=5 and 16..=18 carry meaning, the rest are noise.
    any::<u32>().prop_map(ReachabilityFlags::from_bits)
}

fn any_interface() -> impl Strategy<Value = InterfaceType> {
    prop_oneof![
        Just(InterfaceType::WiredEthernet),
        Just(InterfaceType::Wifi),
        Just(InterfaceType::Cellular),
        Just(InterfaceType::Loopback),
        Just(InterfaceType::Other),
    ]
}

fn any_path() -> impl Strategy<Value = NetworkPath> {
    (
        prop_oneof![
            Just(PathStatus::Satisfied),
            Just(PathStatus::Unsatisfied),
            Just(PathStatus::RequiresConnection),
        ],
        prop::collection::vec(any_interface(), 0..5),
        any::<bool>(),
    )
        .prop_map(|(status, available_interfaces, is_expensive)| NetworkPath {
            status,
            available_interfaces,
            is_expensive,
            is_constrained: false,
        })
}

proptest! {
    #[test]
    fn flags_never_translate_to_unknown(flags in any_flags()) {
        prop_assert_ne!(status_from_flags(flags), ReachabilityStatus::Unknown);
    }

    #[test]
    fn unreachable_flags_are_unavailable(flags in any_flags()) {
        let mut flags = flags;
        flags.remove(ReachabilityFlags::REACHABLE);
        prop_assert_eq!(status_from_flags(flags), ReachabilityStatus::Unavailable);
    }

    #[test]
    fn wwan_wins_when_reachable(flags in any_flags()) {
        let flags = flags | ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN;
        prop_assert_eq!(status_from_flags(flags), ReachabilityStatus::Wwan);
    }

    #[test]
    fn cellular_policy_never_reports_cellular(flags in any_flags(), path in any_path()) {
        let policy = StatusPolicy { allows_cellular: false };
        prop_assert_ne!(policy.apply_status(status_from_flags(flags)), ReachabilityStatus::Wwan);
        prop_assert_ne!(policy.apply_connection(connection_from_path(&path)), Connection::Cellular);
    }

    #[test]
    fn unsatisfied_paths_are_unavailable(path in any_path()) {
        if !path.is_satisfied() {
            prop_assert_eq!(connection_from_path(&path), Connection::Unavailable);
        } else {
            prop_assert!(connection_from_path(&path).is_reachable());
        }
    }

    #[test]
    fn wired_is_preferred_in_any_order(mut interfaces in prop::collection::vec(any_interface(), 0..5), at in 0usize..5) {
        let at = at.min(interfaces.len());
        interfaces.insert(at, InterfaceType::WiredEthernet);
        let path = NetworkPath {
            status: PathStatus::Satisfied,
            available_interfaces: interfaces,
            is_expensive: false,
            is_constrained: false,
        };
        prop_assert_eq!(connection_from_path(&path), Connection::WiredEthernet);
    }

    #[test]
    fn holder_reports_each_run_once(sequence in prop::collection::vec(prop_oneof![
        (0u8..3).prop_map(Ok),
        (0i32..100).prop_map(|code| Err(BridgeError::FactsQueryFailed { code })),
        (0i32..100).prop_map(|code| Err(BridgeError::DeliverySchedulingFailed { code })),
    ], 0..40)) {
        let mut holder = StatusHolder::new();
        let mut changes = 0;
        for next in &sequence {
            if holder.update(next.clone().map(Some)) {
                changes += 1;
            }
        }

        // Consecutive runs of equal facts or same-kind failures collapse.
        let mut expected = 0;
        let mut previous: Option<&Result<u8, BridgeError>> = None;
        for next in &sequence {
            let same = match (previous, next) {
                (Some(Ok(a)), Ok(b)) => a == b,
                (Some(Err(a)), Err(b)) => a.kind() == b.kind(),
                _ => false,
            };
            if !same {
                expected += 1;
            }
            previous = Some(next);
        }
        prop_assert_eq!(changes, expected);
    }
}
