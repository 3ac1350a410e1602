//! Single-value queries.

use crate::error::{ReachabilityError, Result};
use crate::monitor::{Continuation, MonitorBuilder};
use crate::source::Source;
use tokio::sync::oneshot;
use tracing::trace;

impl<S: Source> MonitorBuilder<S> {
    /// Waits for the first status a fresh private monitor observes.
    ///
    /// The initial point query counts as the first observation, so this
    /// resolves right away when the primitive can answer synchronously.
    /// Dropping the future releases the private monitor.
    ///
    /// # Errors
    ///
    /// Fails if the handle cannot be created, or with the first failure the
    /// private monitor observes.
    pub async fn next_status(&self) -> Result<S::Status> {
        let (sender, receiver) = oneshot::channel();
        let mut sender = Some(sender);
        let continuation: Continuation<S::Status> = Box::new(move |update: &Result<S::Status>| {
            if let Some(sender) = sender.take() {
                let _ = sender.send(update.clone());
            }
        });

        let monitor = self.launch_private(Some(continuation), Vec::new())?;
        let result = receiver.await.unwrap_or(Err(ReachabilityError::Released));
        trace!(monitor = %monitor.id(), "Single-value query resolved");
        monitor.stop();
        result
    }
}
