//! # Publisher
//!
//! Demand-driven subscriptions to status updates.
//!
//! A [`StatusPublisher`] stands up a private monitor for every subscriber, so
//! independent subscribers never interfere with each other and cancelling one
//! tears down only its own primitive handle. [`Monitor::subscribe`] attaches a
//! subscriber to an existing monitor instead.
//!
//! Subscribers are called on the monitor's delivery queue. When a subscriber
//! has no outstanding demand, only the newest undelivered value is kept and
//! handed over once demand is requested.
//!
//! [`Monitor::subscribe`]: crate::monitor::Monitor::subscribe

use crate::error::{ReachabilityError, Result};
use crate::monitor::{MonitorBuilder, StatusUpdate};
use crate::source::Source;
use crate::stream::StatusStream;
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::fmt;
use std::ops::Add;
use std::sync::Arc;
use tracing::trace;

/// Number of values a subscriber is ready to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    Unlimited,
    Max(usize),
}

impl Demand {
    pub const NONE: Demand = Demand::Max(0);

    pub fn is_none(&self) -> bool {
        *self == Demand::NONE
    }

    fn consume_one(&mut self) {
        if let Demand::Max(remaining) = self {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

impl Add for Demand {
    type Output = Demand;

    fn add(self, rhs: Demand) -> Demand {
        match (self, rhs) {
            (Demand::Max(a), Demand::Max(b)) => Demand::Max(a.saturating_add(b)),
            _ => Demand::Unlimited,
        }
    }
}

/// Terminal event of a subscription.
#[derive(Debug, Clone)]
pub enum Completion {
    Finished,
    Failure(ReachabilityError),
}

/// Consumer of a publisher's values.
pub trait Subscriber<T>: Send + 'static {
    /// Demand granted when the subscription starts.
    fn initial_demand(&self) -> Demand {
        Demand::Unlimited
    }

    /// Handles one value and returns any additional demand.
    fn receive(&mut self, value: T) -> Demand;

    fn receive_completion(&mut self, completion: Completion);
}

/// Subscriber built from two closures, requesting unlimited demand.
pub struct Sink<V, C> {
    on_value: V,
    on_completion: C,
}

/// Creates a [`Sink`] subscriber.
pub fn sink<T, V, C>(on_value: V, on_completion: C) -> Sink<V, C>
where
    V: FnMut(T) + Send + 'static,
    C: FnMut(Completion) + Send + 'static,
{
    Sink {
        on_value,
        on_completion,
    }
}

impl<T, V, C> Subscriber<T> for Sink<V, C>
where
    V: FnMut(T) + Send + 'static,
    C: FnMut(Completion) + Send + 'static,
{
    fn receive(&mut self, value: T) -> Demand {
        (self.on_value)(value);
        Demand::NONE
    }

    fn receive_completion(&mut self, completion: Completion) {
        (self.on_completion)(completion);
    }
}

struct SinkState<T> {
    /// Taken out while a value is being delivered.
    subscriber: Option<Box<dyn Subscriber<T>>>,
    demand: Demand,
    pending: Option<T>,
    /// Completion that arrived while the subscriber was taken out.
    pending_completion: Option<Completion>,
    terminated: bool,
}

/// Per-subscriber buffer between a monitor and one subscriber.
pub(crate) struct SubjectSink<T> {
    state: Mutex<SinkState<T>>,
}

impl<T: Send + 'static> SubjectSink<T> {
    pub(crate) fn new<Sub>(subscriber: Sub) -> Self
    where
        Sub: Subscriber<T>,
    {
        let demand = subscriber.initial_demand();
        Self {
            state: Mutex::new(SinkState {
                subscriber: Some(Box::new(subscriber)),
                demand,
                pending: None,
                pending_completion: None,
                terminated: false,
            }),
        }
    }

    pub(crate) fn send(&self, update: StatusUpdate<T>) {
        match update {
            Ok(value) => {
                let mut state = self.state.lock();
                if state.terminated {
                    return;
                }
                state.pending = Some(value);
                self.drain(state);
            }
            Err(err) => self.complete(Completion::Failure(err)),
        }
    }

    pub(crate) fn complete(&self, completion: Completion) {
        let mut state = self.state.lock();
        if state.terminated {
            return;
        }
        state.terminated = true;
        state.pending = None;
        match state.subscriber.take() {
            Some(mut subscriber) => {
                drop(state);
                subscriber.receive_completion(completion);
            }
            None => state.pending_completion = Some(completion),
        }
    }

    fn drain<'a>(&'a self, mut state: MutexGuard<'a, SinkState<T>>) {
        loop {
            if state.terminated || state.demand.is_none() || state.pending.is_none() {
                return;
            }
            // Another frame is already delivering and will pick up the value.
            let Some(mut subscriber) = state.subscriber.take() else {
                return;
            };
            let Some(value) = state.pending.take() else {
                state.subscriber = Some(subscriber);
                return;
            };
            state.demand.consume_one();
            drop(state);

            let additional = subscriber.receive(value);

            state = self.state.lock();
            state.demand = state.demand + additional;
            if state.terminated {
                if let Some(completion) = state.pending_completion.take() {
                    drop(state);
                    subscriber.receive_completion(completion);
                }
                return;
            }
            state.subscriber = Some(subscriber);
        }
    }
}

trait SubscriptionControl: Send + Sync {
    fn request(&self, demand: Demand);
    fn cancel(&self);
    fn is_active(&self) -> bool;
}

impl<T: Send + 'static> SubscriptionControl for SubjectSink<T> {
    fn request(&self, demand: Demand) {
        let mut state = self.state.lock();
        if state.terminated {
            return;
        }
        state.demand = state.demand + demand;
        self.drain(state);
    }

    fn cancel(&self) {
        let subscriber = {
            let mut state = self.state.lock();
            state.terminated = true;
            state.pending = None;
            state.pending_completion = None;
            state.subscriber.take()
        };
        drop(subscriber);
    }

    fn is_active(&self) -> bool {
        !self.state.lock().terminated
    }
}

impl<T: Send + 'static> SubjectSink<T> {
    pub(crate) fn is_active(&self) -> bool {
        SubscriptionControl::is_active(self)
    }
}

/// Handle to one subscriber's subscription. Dropping it cancels.
pub struct Subscription {
    control: Arc<dyn SubscriptionControl>,
    /// Private monitor owned by this subscription, if any.
    monitor: Option<Box<dyn Any + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<T: Send + 'static>(
        sink: Arc<SubjectSink<T>>,
        monitor: Option<Box<dyn Any + Send + Sync>>,
    ) -> Self {
        Self {
            control: sink,
            monitor,
        }
    }

    /// Grants additional demand, delivering a buffered value if one is waiting.
    pub fn request(&self, demand: Demand) {
        self.control.request(demand);
    }

    /// Stops delivery and releases the private monitor. No completion is sent.
    pub fn cancel(&mut self) {
        self.control.cancel();
        if self.monitor.take().is_some() {
            trace!("Released subscription monitor");
        }
    }

    /// Whether values or a completion can still arrive.
    pub fn is_active(&self) -> bool {
        self.control.is_active()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .field("owns_monitor", &self.monitor.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Publishes status updates, one private monitor per subscriber.
pub struct StatusPublisher<S: Source> {
    builder: MonitorBuilder<S>,
}

impl<S: Source> Clone for StatusPublisher<S> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for StatusPublisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPublisher")
            .field("builder", &self.builder)
            .finish()
    }
}

impl<S: Source> StatusPublisher<S> {
    pub(crate) fn new(builder: MonitorBuilder<S>) -> Self {
        Self { builder }
    }

    /// Stands up a private monitor feeding `subscriber`.
    ///
    /// The subscriber receives the initial status on the delivery queue.
    ///
    /// # Errors
    ///
    /// Fails if the primitive cannot create a handle for the target.
    pub fn subscribe<Sub>(&self, subscriber: Sub) -> Result<Subscription>
    where
        Sub: Subscriber<S::Status>,
    {
        let sink = Arc::new(SubjectSink::new(subscriber));
        let monitor = self.builder.launch_private(None, vec![Arc::clone(&sink)])?;
        Ok(Subscription::new(sink, Some(Box::new(monitor))))
    }

    pub fn stream(&self) -> Result<StatusStream<S>> {
        self.builder.stream()
    }

    pub async fn next_status(&self) -> Result<S::Status> {
        self.builder.next_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct Recorder {
        values: Arc<StdMutex<Vec<u32>>>,
        completions: Arc<StdMutex<Vec<String>>>,
        initial: Demand,
        each: Demand,
    }

    impl Subscriber<u32> for Recorder {
        fn initial_demand(&self) -> Demand {
            self.initial
        }

        fn receive(&mut self, value: u32) -> Demand {
            self.values.lock().unwrap().push(value);
            self.each
        }

        fn receive_completion(&mut self, completion: Completion) {
            let label = match completion {
                Completion::Finished => "finished".to_string(),
                Completion::Failure(err) => format!("failure: {err}"),
            };
            self.completions.lock().unwrap().push(label);
        }
    }

    fn recorder(
        initial: Demand,
        each: Demand,
    ) -> (Recorder, Arc<StdMutex<Vec<u32>>>, Arc<StdMutex<Vec<String>>>) {
        let values = Arc::new(StdMutex::new(Vec::new()));
        let completions = Arc::new(StdMutex::new(Vec::new()));
        (
            Recorder {
                values: Arc::clone(&values),
                completions: Arc::clone(&completions),
                initial,
                each,
            },
            values,
            completions,
        )
    }

    #[test]
    fn test_demand_arithmetic() {
        assert_eq!(Demand::Max(1) + Demand::Max(2), Demand::Max(3));
        assert_eq!(Demand::Max(1) + Demand::Unlimited, Demand::Unlimited);
        assert_eq!(Demand::Max(usize::MAX) + Demand::Max(1), Demand::Max(usize::MAX));
        assert!(Demand::NONE.is_none());

        let mut demand = Demand::Max(1);
        demand.consume_one();
        demand.consume_one();
        assert!(demand.is_none());
    }

    #[test]
    fn test_unlimited_demand_receives_everything() {
        let (subscriber, values, _) = recorder(Demand::Unlimited, Demand::NONE);
        let sink = SubjectSink::new(subscriber);
        sink.send(Ok(1));
        sink.send(Ok(2));
        assert_eq!(*values.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_zero_demand_keeps_newest_value() {
        let (subscriber, values, _) = recorder(Demand::NONE, Demand::NONE);
        let sink = Arc::new(SubjectSink::new(subscriber));
        sink.send(Ok(1));
        sink.send(Ok(2));
        sink.send(Ok(3));
        assert!(values.lock().unwrap().is_empty());

        let subscription = Subscription::new(Arc::clone(&sink), None);
        subscription.request(Demand::Max(1));
        assert_eq!(*values.lock().unwrap(), vec![3]);

        sink.send(Ok(4));
        assert_eq!(*values.lock().unwrap(), vec![3]);
        subscription.request(Demand::Max(5));
        assert_eq!(*values.lock().unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_demand_returned_from_receive_is_added() {
        let (subscriber, values, _) = recorder(Demand::Max(1), Demand::Max(1));
        let sink = SubjectSink::new(subscriber);
        for i in 0..4 {
            sink.send(Ok(i));
        }
        assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_failure_completes_once() {
        let (subscriber, values, completions) = recorder(Demand::Unlimited, Demand::NONE);
        let sink = SubjectSink::new(subscriber);
        sink.send(Err(ReachabilityError::Cancelled));
        sink.send(Ok(1));
        sink.complete(Completion::Finished);

        assert!(values.lock().unwrap().is_empty());
        assert_eq!(completions.lock().unwrap().len(), 1);
        assert!(completions.lock().unwrap()[0].starts_with("failure"));
        assert!(!sink.is_active());
    }

    #[test]
    fn test_cancel_sends_no_completion() {
        let (subscriber, values, completions) = recorder(Demand::Unlimited, Demand::NONE);
        let sink = Arc::new(SubjectSink::new(subscriber));
        let mut subscription = Subscription::new(Arc::clone(&sink), None);
        assert!(subscription.is_active());

        subscription.cancel();
        sink.send(Ok(1));
        sink.complete(Completion::Finished);

        assert!(!subscription.is_active());
        assert!(values.lock().unwrap().is_empty());
        assert!(completions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_values = Arc::clone(&seen);
        let sink = SubjectSink::new(sink(
            move |value: u32| seen_values.lock().unwrap().push(value),
            |_completion| {},
        ));
        sink.send(Ok(7));
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }
}
