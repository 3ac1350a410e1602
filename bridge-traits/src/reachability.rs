//! Flags-based Reachability Primitive
//!
//! Models the OS facility that reports a reachability bitset for a target
//! (the default route, a named host or a socket address) and calls back
//! whenever that bitset changes.

use std::fmt;
use std::net::SocketAddr;
use std::ops::BitOr;
use std::sync::Arc;

use crate::error::Result;

/// Raw reachability bitset as reported by the platform.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReachabilityFlags(u32);

impl ReachabilityFlags {
    pub const TRANSIENT_CONNECTION: Self = Self(1 << 0);
    pub const REACHABLE: Self = Self(1 << 1);
    pub const CONNECTION_REQUIRED: Self = Self(1 << 2);
    pub const CONNECTION_ON_TRAFFIC: Self = Self(1 << 3);
    pub const INTERVENTION_REQUIRED: Self = Self(1 << 4);
    pub const CONNECTION_ON_DEMAND: Self = Self(1 << 5);
    pub const IS_LOCAL_ADDRESS: Self = Self(1 << 16);
    pub const IS_DIRECT: Self = Self(1 << 17);
    pub const IS_WWAN: Self = Self(1 << 18);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ReachabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ReachabilityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |flag: Self, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{} {}{}{}{}{}{}{}",
            mark(Self::IS_WWAN, 'W'),
            mark(Self::REACHABLE, 'R'),
            mark(Self::CONNECTION_REQUIRED, 'c'),
            mark(Self::TRANSIENT_CONNECTION, 't'),
            mark(Self::INTERVENTION_REQUIRED, 'i'),
            mark(Self::CONNECTION_ON_TRAFFIC, 'C'),
            mark(Self::CONNECTION_ON_DEMAND, 'D'),
            mark(Self::IS_LOCAL_ADDRESS, 'l'),
            mark(Self::IS_DIRECT, 'd'),
        )
    }
}

impl fmt::Debug for ReachabilityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReachabilityFlags({self} / {:#x})", self.0)
    }
}

/// What a reachability handle observes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReachabilityTarget {
    /// The default route ("is anything reachable at all").
    General,
    /// A named host. The name is not resolved by this layer.
    Host(String),
    /// A specific socket address.
    Address(SocketAddr),
}

impl fmt::Display for ReachabilityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachabilityTarget::General => f.write_str("general"),
            ReachabilityTarget::Host(name) => write!(f, "host {name:?}"),
            ReachabilityTarget::Address(addr) => write!(f, "address {addr}"),
        }
    }
}

/// Callback installed on a [`ReachabilityHandle`].
///
/// Invoked from the primitive's own background context with the latest flags.
pub type FlagsCallback = Arc<dyn Fn(ReachabilityFlags) + Send + Sync>;

/// Factory for flags-based reachability handles.
///
/// # Platform Support
///
/// - **Desktop (Linux)**: `/sys/class/net` interface state (`bridge-desktop`)
/// - **Apple**: SystemConfiguration network reachability
/// - **Android**: ConnectivityManager default network callbacks
pub trait ReachabilityProvider: Send + Sync {
    /// Acquire a handle for `target`.
    ///
    /// Fails with [`BridgeError::CreationFailed`](crate::BridgeError::CreationFailed)
    /// when the target cannot be turned into a monitorable handle.
    fn create(&self, target: &ReachabilityTarget) -> Result<Box<dyn ReachabilityHandle>>;
}

/// One OS reachability handle.
pub trait ReachabilityHandle: Send {
    /// Install (or with `None`, remove) the single delivery callback.
    fn set_callback(&mut self, callback: Option<FlagsCallback>) -> Result<()>;

    /// Start delivering callbacks from the handle's background context.
    fn schedule_delivery(&mut self) -> Result<()>;

    /// Synchronous point query.
    fn current_flags(&self) -> Result<ReachabilityFlags>;

    /// Unregister the callback and stop delivery. Idempotent.
    fn teardown(&mut self);
}
