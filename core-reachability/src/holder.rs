//! Change detection for raw facts.

use bridge_traits::BridgeError;

/// Last observed facts, or the failure that replaced them.
///
/// Two failures of the same kind compare equal whatever their OS codes, since
/// those codes vary between otherwise identical failures.
#[derive(Debug, Clone)]
pub struct StatusHolder<F> {
    current: Result<Option<F>, BridgeError>,
}

impl<F> Default for StatusHolder<F> {
    fn default() -> Self {
        Self { current: Ok(None) }
    }
}

impl<F: PartialEq> StatusHolder<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Result<Option<F>, BridgeError> {
        &self.current
    }

    pub fn facts(&self) -> Option<&F> {
        self.current.as_ref().ok().and_then(Option::as_ref)
    }

    pub fn error(&self) -> Option<&BridgeError> {
        self.current.as_ref().err()
    }

    /// Stores `next` and reports whether it differs from the previous value.
    pub fn update(&mut self, next: Result<Option<F>, BridgeError>) -> bool {
        let changed = match (&self.current, &next) {
            (Ok(previous), Ok(next)) => previous != next,
            (Err(previous), Err(next)) => previous.kind() != next.kind(),
            _ => true,
        };
        self.current = next;
        changed
    }
}
