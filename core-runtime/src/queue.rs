//! # Delivery Queues
//!
//! Serial execution contexts that consumer-facing callbacks are dispatched on.
//!
//! OS primitives call back from their own background context. Consumers should
//! never observe that context: every update is re-dispatched onto a
//! [`DeliveryQueue`], which runs jobs one at a time in submission order.
//!
//! - [`DeliveryQueue::main`] - the process-wide default queue, backed by a
//!   dedicated thread. It plays the role of an application's main thread for
//!   hosts that don't have one.
//! - [`DeliveryQueue::serial`] - a private queue with its own thread.
//! - [`DeliveryQueue::immediate`] - runs jobs inline on the calling thread.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

use crate::error::{Error, Result};

/// Label of the process-wide default queue.
pub const MAIN_QUEUE_LABEL: &str = "reachability.main";

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serial execution context for consumer callbacks.
///
/// Cloning a queue yields another handle to the same context. A dedicated
/// queue's thread exits once every handle has been dropped and the pending
/// jobs have run.
#[derive(Clone)]
pub struct DeliveryQueue {
    kind: QueueKind,
}

#[derive(Clone)]
enum QueueKind {
    Immediate,
    Serial(Arc<SerialQueue>),
}

struct SerialQueue {
    label: String,
    sender: mpsc::UnboundedSender<Job>,
}

impl DeliveryQueue {
    /// Process-wide default queue.
    pub fn main() -> Self {
        static MAIN: OnceLock<DeliveryQueue> = OnceLock::new();

        MAIN.get_or_init(|| match Self::serial(MAIN_QUEUE_LABEL) {
            Ok(queue) => queue,
            Err(err) => {
                warn!(error = %err, "Falling back to immediate delivery for the main queue");
                Self::immediate()
            }
        })
        .clone()
    }

    /// Queue that runs every job inline on the dispatching thread.
    pub fn immediate() -> Self {
        Self {
            kind: QueueKind::Immediate,
        }
    }

    /// Dedicated serial queue with its own thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueSpawn`] if the worker thread cannot be spawned.
    pub fn serial(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let thread_label = label.clone();
        thread::Builder::new()
            .name(label.clone())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!(queue = %thread_label, "Delivery job panicked");
                    }
                }
            })
            .map_err(|e| Error::QueueSpawn {
                label: label.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            kind: QueueKind::Serial(Arc::new(SerialQueue { label, sender })),
        })
    }

    pub fn label(&self) -> &str {
        match &self.kind {
            QueueKind::Immediate => "immediate",
            QueueKind::Serial(queue) => &queue.label,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self.kind, QueueKind::Immediate)
    }

    /// Runs `job` on this queue after every previously dispatched job.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.kind {
            QueueKind::Immediate => job(),
            QueueKind::Serial(queue) => {
                if queue.sender.send(Box::new(job)).is_err() {
                    // Only possible if the worker thread died outside a job.
                    error!(queue = %queue.label, "Delivery queue is gone, dropping job");
                }
            }
        }
    }

    /// Resolves once every job dispatched before this call has run.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.dispatch(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("label", &self.label())
            .finish()
    }
}
