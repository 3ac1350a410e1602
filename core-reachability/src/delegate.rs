use crate::error::ReachabilityError;
use crate::monitor::Monitor;
use crate::source::Source;

/// Receives a monitor's updates on its delivery queue.
///
/// Monitors hold their delegate weakly; keep your own `Arc` alive for as long
/// as you want to be called.
pub trait ReachabilityDelegate<S: Source>: Send + Sync {
    fn reachability_changed(&self, monitor: &Monitor<S>, status: S::Status);

    fn reachability_failed(&self, monitor: &Monitor<S>, error: &ReachabilityError);
}
