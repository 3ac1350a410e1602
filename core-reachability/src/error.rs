use bridge_traits::{BridgeError, ErrorKind};
use thiserror::Error;

/// Failure reported by a monitor or one of its channels.
#[derive(Error, Debug, Clone)]
pub enum ReachabilityError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Reachability monitoring was cancelled")]
    Cancelled,

    #[error("Reachability monitor was stopped or released")]
    Released,
}

impl ReachabilityError {
    /// Kind of the underlying primitive failure, if there is one.
    pub fn bridge_kind(&self) -> Option<ErrorKind> {
        match self {
            ReachabilityError::Bridge(err) => Some(err.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReachabilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_is_transparent() {
        let err: ReachabilityError = BridgeError::FactsQueryFailed { code: 5 }.into();
        assert_eq!(
            err.to_string(),
            BridgeError::FactsQueryFailed { code: 5 }.to_string()
        );
        assert_eq!(err.bridge_kind(), Some(ErrorKind::FactsQuery));
        assert_eq!(ReachabilityError::Cancelled.bridge_kind(), None);
    }
}
