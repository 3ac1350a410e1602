//! # Status Streams
//!
//! Async sequence of status updates with newest-one buffering: a consumer
//! that falls behind only sees the most recent update once it resumes.
//!
//! A stream either borrows a live monitor ([`Monitor::updates`]) or owns a
//! private one ([`MonitorBuilder::stream`]). An owned monitor is released as
//! soon as the stream ends or is dropped.
//!
//! The stream ends:
//! - after yielding a failure,
//! - after yielding [`ReachabilityError::Cancelled`] when its cancellation
//!   token fires,
//! - when the monitor is stopped or released.
//!
//! [`Monitor::updates`]: crate::monitor::Monitor::updates
//! [`MonitorBuilder::stream`]: crate::monitor::MonitorBuilder::stream

use crate::error::ReachabilityError;
use crate::monitor::{Monitor, StatusUpdate, UpdateReceiver};
use crate::source::Source;
use futures::{Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::debug;

pub struct StatusStream<S: Source> {
    monitor: Option<Monitor<S>>,
    updates: WatchStream<Option<StatusUpdate<S::Status>>>,
    cancellation: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    finished: bool,
}

// No field is structurally pinned.
impl<S: Source> Unpin for StatusStream<S> {}

impl<S: Source> StatusStream<S> {
    pub(crate) fn new(monitor: Option<Monitor<S>>, receiver: UpdateReceiver<S::Status>) -> Self {
        Self {
            monitor,
            updates: WatchStream::new(receiver),
            cancellation: None,
            finished: false,
        }
    }

    /// Ends the stream with [`ReachabilityError::Cancelled`] once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(Box::pin(token.cancelled_owned()));
        self
    }

    /// The private monitor backing this stream, while it runs.
    pub fn monitor(&self) -> Option<&Monitor<S>> {
        self.monitor.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) {
        self.finished = true;
        self.cancellation = None;
        if let Some(monitor) = self.monitor.take() {
            debug!(monitor = %monitor.id(), "Stream finished, releasing its monitor");
        }
    }
}

impl<S: Source> Stream for StatusStream<S> {
    type Item = StatusUpdate<S::Status>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        if let Some(cancellation) = this.cancellation.as_mut() {
            if cancellation.as_mut().poll(cx).is_ready() {
                this.finish();
                return Poll::Ready(Some(Err(ReachabilityError::Cancelled)));
            }
        }

        loop {
            match this.updates.poll_next_unpin(cx) {
                // Nothing observed yet.
                Poll::Ready(Some(None)) => continue,
                Poll::Ready(Some(Some(Ok(status)))) => return Poll::Ready(Some(Ok(status))),
                Poll::Ready(Some(Some(Err(err)))) => {
                    this.finish();
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.finish();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S: Source> fmt::Debug for StatusStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusStream")
            .field("monitor", &self.monitor.as_ref().map(Monitor::id))
            .field("cancellable", &self.cancellation.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}
