//! # Monitor
//!
//! A [`Monitor`] owns one primitive handle through its [`Source`], installs a
//! single low-level callback, and turns every change it detects into
//! notifications on all attached channels.
//!
//! ## Pipeline
//!
//! ```text
//! primitive callback ──> CallbackContext (weak) ──> receive()
//!                                                     │ StatusHolder::update
//!                                                     │   (duplicates stop here)
//!                                                     ├──> continuation      (synchronous)
//!                                                     ├──> update stream     (synchronous)
//!                                                     └──> DeliveryQueue job:
//!                                                            handler, when_reachable /
//!                                                            when_unreachable, delegate,
//!                                                            subjects, notification
//! ```
//!
//! The primitive only ever holds a weak reference to the monitor, so a
//! callback arriving after the last [`Monitor`] handle was dropped is ignored.
//! Dropping the last handle (or calling [`Monitor::stop`]) tears the primitive
//! down, finishes open update streams and completes attached subjects.

use crate::delegate::ReachabilityDelegate;
use crate::error::{ReachabilityError, Result};
use crate::holder::StatusHolder;
use crate::notification::{default_center, MonitorRef, REACHABILITY_CHANGED};
use crate::publisher::{Completion, StatusPublisher, SubjectSink, Subscriber, Subscription};
use crate::source::{FactsCallback, FlagsSource, PathSource, Source, SourceFactory};
use crate::status::Reachable;
use crate::stream::StatusStream;
use crate::translate::StatusPolicy;
use bridge_traits::{
    BridgeError, InterfaceType, NetworkPath, PathMonitorProvider, PathTarget, ReachabilityFlags,
    ReachabilityProvider, ReachabilityTarget,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::NotificationCenter;
use core_runtime::queue::DeliveryQueue;
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Value delivered on every channel.
pub type StatusUpdate<T> = Result<T>;

/// Closure receiving every update together with the monitor that produced it.
pub type UpdateHandler<S> =
    Arc<dyn Fn(&Monitor<S>, StatusUpdate<<S as Source>::Status>) + Send + Sync>;

/// Closure for `when_reachable` / `when_unreachable`.
pub type MonitorCallback<S> = Arc<dyn Fn(&Monitor<S>) + Send + Sync>;

/// Synchronous hook fed at change detection, ahead of the queued batch.
pub(crate) type Continuation<T> = Box<dyn FnMut(&StatusUpdate<T>) + Send>;

/// Flags-based monitor.
pub type Reachability = Monitor<FlagsSource>;

/// Path-based monitor.
pub type PathMonitor = Monitor<PathSource>;

/// Process-unique monitor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(u64);

impl MonitorId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reachability-{}", self.0)
    }
}

/// Delivery settings shared by every monitor a builder creates.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub queue: DeliveryQueue,
    pub policy: StatusPolicy,
    pub center: NotificationCenter<MonitorRef>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            queue: DeliveryQueue::main(),
            policy: StatusPolicy::default(),
            center: default_center(),
        }
    }
}

impl MonitorOptions {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            queue: config.delivery_queue(),
            policy: StatusPolicy {
                allows_cellular: config.allows_cellular,
            },
            center: default_center(),
        }
    }
}

struct Consumers<S: Source> {
    handler: Option<UpdateHandler<S>>,
    when_reachable: Option<MonitorCallback<S>>,
    when_unreachable: Option<MonitorCallback<S>>,
    delegate: Option<Weak<dyn ReachabilityDelegate<S>>>,
}

impl<S: Source> Default for Consumers<S> {
    fn default() -> Self {
        Self {
            handler: None,
            when_reachable: None,
            when_unreachable: None,
            delegate: None,
        }
    }
}

impl<S: Source> Clone for Consumers<S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            when_reachable: self.when_reachable.clone(),
            when_unreachable: self.when_unreachable.clone(),
            delegate: self.delegate.clone(),
        }
    }
}

fn downgrade_delegate<S, D>(delegate: &Arc<D>) -> Weak<dyn ReachabilityDelegate<S>>
where
    S: Source,
    D: ReachabilityDelegate<S> + 'static,
{
    let delegate: Arc<dyn ReachabilityDelegate<S>> = delegate.clone();
    Arc::downgrade(&delegate)
}

/// Consumers captured at change detection, delivered on the queue.
struct Batch<S: Source> {
    consumers: Consumers<S>,
    sinks: Vec<Arc<SubjectSink<S::Status>>>,
    update: StatusUpdate<S::Status>,
}

impl<S: Source> Batch<S> {
    fn deliver(self, monitor: &Monitor<S>, center: &NotificationCenter<MonitorRef>) {
        let Batch {
            consumers,
            sinks,
            update,
        } = self;

        if let Some(handler) = &consumers.handler {
            handler(monitor, update.clone());
        }

        if let Ok(status) = &update {
            let callback = if status.is_reachable() {
                &consumers.when_reachable
            } else {
                &consumers.when_unreachable
            };
            if let Some(callback) = callback {
                callback(monitor);
            }
        }

        if let Some(delegate) = consumers.delegate.as_ref().and_then(Weak::upgrade) {
            match &update {
                Ok(status) => delegate.reachability_changed(monitor, status.clone()),
                Err(err) => delegate.reachability_failed(monitor, err),
            }
        }

        for sink in &sinks {
            sink.send(update.clone());
        }

        center.post(REACHABILITY_CHANGED, S::notification_ref(monitor.downgrade()));
    }
}

struct State<S: Source> {
    holder: StatusHolder<S::Facts>,
    consumers: Consumers<S>,
    continuation: Option<Continuation<S::Status>>,
    sinks: Vec<Arc<SubjectSink<S::Status>>>,
    stopped: bool,
    failed: bool,
}

type UpdateSender<T> = watch::Sender<Option<StatusUpdate<T>>>;
pub(crate) type UpdateReceiver<T> = watch::Receiver<Option<StatusUpdate<T>>>;

struct Shared<S: Source> {
    id: MonitorId,
    label: String,
    options: MonitorOptions,
    source: Mutex<Option<S>>,
    /// Serializes change detection. Reentrant so a consumer running on an
    /// immediate queue can call back into the monitor.
    pipeline: ReentrantMutex<()>,
    state: Mutex<State<S>>,
    deliveries: Mutex<Deliveries<S>>,
    updates: Mutex<Option<UpdateSender<S::Status>>>,
}

struct Deliveries<S: Source> {
    pending: VecDeque<Batch<S>>,
    draining: bool,
}

/// Releases the drain slot if a consumer panics mid-delivery.
struct DrainUnwind<'a, S: Source>(&'a Mutex<Deliveries<S>>);

impl<S: Source> Drop for DrainUnwind<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}

/// Non-owning context handed to the primitive's callback.
struct CallbackContext<S: Source> {
    monitor: Weak<Shared<S>>,
}

impl<S: Source> CallbackContext<S> {
    fn deliver(&self, facts: S::Facts) {
        match self.monitor.upgrade() {
            Some(shared) => shared.receive(Ok(Some(facts))),
            None => trace!("Callback for a released monitor ignored"),
        }
    }
}

impl<S: Source> Shared<S> {
    fn start(self: &Arc<Self>) {
        let context = CallbackContext {
            monitor: Arc::downgrade(self),
        };
        let callback: FactsCallback<S::Facts> = Arc::new(move |facts| context.deliver(facts));

        // The source lock must not be held across install: primitives may
        // deliver the first callback synchronously.
        let Some(mut source) = self.source.lock().take() else {
            return;
        };
        let installed = source.install(callback);
        if self.state.lock().stopped {
            source.teardown();
            return;
        }
        *self.source.lock() = Some(source);

        match installed {
            Ok(()) => {
                // A failed point query is recorded in the holder and fanned out.
                let _ = self.refresh();
            }
            Err(err) => {
                warn!(monitor = %self.id, target_desc = %self.label, error = %err, "Failed to install reachability callback");
                self.receive(Err(err));
            }
        }
    }

    fn refresh(self: &Arc<Self>) -> Result<S::Status> {
        // Held across the query so a callback landing meanwhile is applied
        // after the queried facts, not overwritten by them.
        let _pipeline = self.pipeline.lock();
        let facts = match self.source.lock().as_ref() {
            Some(source) => source.current_facts(),
            None => return Err(ReachabilityError::Released),
        };
        self.receive(facts);
        self.current_status()
    }

    fn receive(self: &Arc<Self>, next: std::result::Result<Option<S::Facts>, BridgeError>) {
        let _pipeline = self.pipeline.lock();
        let mut state = self.state.lock();

        if state.stopped {
            trace!(monitor = %self.id, "Update for a stopped monitor ignored");
            return;
        }
        if state.failed && next.is_ok() {
            trace!(monitor = %self.id, "Facts after a failure ignored");
            return;
        }
        if !state.holder.update(next) {
            trace!(monitor = %self.id, "Duplicate update suppressed");
            return;
        }

        let update = match state.holder.current().clone() {
            Ok(facts) => {
                let status = S::status(facts.as_ref(), &self.options.policy);
                debug!(monitor = %self.id, target_desc = %self.label, status = ?status, facts = ?facts, "Status changed");
                Ok(status)
            }
            Err(err) => {
                state.failed = true;
                warn!(monitor = %self.id, target_desc = %self.label, error = %err, "Monitor failed");
                Err(ReachabilityError::from(err))
            }
        };

        if let Some(continuation) = state.continuation.as_mut() {
            continuation(&update);
        }
        if let Some(sender) = self.updates.lock().as_ref() {
            sender.send_replace(Some(update.clone()));
        }

        state.sinks.retain(|sink| sink.is_active());
        let batch = Batch {
            consumers: state.consumers.clone(),
            sinks: state.sinks.clone(),
            update,
        };
        drop(state);
        self.deliveries.lock().pending.push_back(batch);

        let weak = Arc::downgrade(self);
        self.options.queue.dispatch(move || {
            if let Some(shared) = weak.upgrade() {
                shared.drain_deliveries();
            }
        });
    }

    /// Delivers pending batches in detection order. A consumer that triggers
    /// another update from inside a delivery only enqueues it: the outermost
    /// frame delivers it once the current batch has reached every channel.
    fn drain_deliveries(self: &Arc<Self>) {
        {
            let mut deliveries = self.deliveries.lock();
            if deliveries.draining {
                return;
            }
            deliveries.draining = true;
        }

        let _unwind = DrainUnwind(&self.deliveries);
        let monitor = Monitor {
            shared: Arc::clone(self),
        };
        loop {
            let batch = {
                let mut deliveries = self.deliveries.lock();
                match deliveries.pending.pop_front() {
                    Some(batch) => batch,
                    None => {
                        deliveries.draining = false;
                        break;
                    }
                }
            };
            batch.deliver(&monitor, &self.options.center);
        }
    }

    fn current_status(&self) -> Result<S::Status> {
        let state = self.state.lock();
        match state.holder.current() {
            Ok(facts) => Ok(S::status(facts.as_ref(), &self.options.policy)),
            Err(err) => Err(err.clone().into()),
        }
    }

    fn subscribe_updates(&self) -> UpdateReceiver<S::Status> {
        match self.updates.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(None);
                drop(sender);
                receiver
            }
        }
    }

    fn shutdown(&self) {
        let _pipeline = self.pipeline.lock();

        let sinks = {
            let mut state = self.state.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
            state.continuation = None;
            std::mem::take(&mut state.sinks)
        };

        let source = self.source.lock().take();
        if let Some(mut source) = source {
            source.teardown();
        }
        self.updates.lock().take();

        if !sinks.is_empty() {
            self.options.queue.dispatch(move || {
                for sink in sinks {
                    sink.complete(Completion::Finished);
                }
            });
        }

        info!(monitor = %self.id, target_desc = %self.label, "Monitor stopped");
    }
}

impl<S: Source> Drop for Shared<S> {
    fn drop(&mut self) {
        self.shutdown();
        // Put back by an install that raced with stop.
        if let Some(mut source) = self.source.get_mut().take() {
            source.teardown();
        }
    }
}

/// Reachability monitor over one primitive handle.
///
/// Cloning yields another handle to the same monitor. The primitive is torn
/// down when the last handle is dropped.
pub struct Monitor<S: Source> {
    shared: Arc<Shared<S>>,
}

impl<S: Source> Clone for Monitor<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Source> fmt::Debug for Monitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("id", &self.shared.id)
            .field("target", &self.shared.label)
            .field("queue", &self.shared.options.queue.label())
            .field("status", &self.current_status())
            .finish()
    }
}

impl<S: Source> Monitor<S> {
    fn launch(
        source: S,
        options: MonitorOptions,
        consumers: Consumers<S>,
        continuation: Option<Continuation<S::Status>>,
        sinks: Vec<Arc<SubjectSink<S::Status>>>,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            id: MonitorId::next(),
            label: source.describe(),
            options,
            source: Mutex::new(Some(source)),
            pipeline: ReentrantMutex::new(()),
            state: Mutex::new(State {
                holder: StatusHolder::new(),
                consumers,
                continuation,
                sinks,
                stopped: false,
                failed: false,
            }),
            deliveries: Mutex::new(Deliveries {
                pending: VecDeque::new(),
                draining: false,
            }),
            updates: Mutex::new(Some(sender)),
        });

        info!(
            monitor = %shared.id,
            target_desc = %shared.label,
            queue = %shared.options.queue.label(),
            "Monitor created"
        );
        shared.start();
        Self { shared }
    }

    pub fn id(&self) -> MonitorId {
        self.shared.id
    }

    /// Description of the monitored target.
    pub fn target_description(&self) -> &str {
        &self.shared.label
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.shared.options.queue
    }

    pub fn allows_cellular(&self) -> bool {
        self.shared.options.policy.allows_cellular
    }

    /// Status derived from the last observed facts.
    ///
    /// # Errors
    ///
    /// Returns the failure that put the monitor into its failed state.
    pub fn current_status(&self) -> Result<S::Status> {
        self.shared.current_status()
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.current_status(), Ok(status) if status.is_reachable())
    }

    /// Last observed raw facts.
    pub fn current_facts(&self) -> Option<S::Facts> {
        self.shared.state.lock().holder.facts().cloned()
    }

    /// Queries the primitive now and runs the result through change detection.
    pub fn refresh(&self) -> Result<S::Status> {
        self.shared.refresh()
    }

    pub fn set_update_handler<F>(&self, handler: F)
    where
        F: Fn(&Monitor<S>, StatusUpdate<S::Status>) + Send + Sync + 'static,
    {
        self.shared.state.lock().consumers.handler = Some(Arc::new(handler));
    }

    pub fn clear_update_handler(&self) {
        self.shared.state.lock().consumers.handler = None;
    }

    pub fn set_when_reachable<F>(&self, callback: F)
    where
        F: Fn(&Monitor<S>) + Send + Sync + 'static,
    {
        self.shared.state.lock().consumers.when_reachable = Some(Arc::new(callback));
    }

    pub fn set_when_unreachable<F>(&self, callback: F)
    where
        F: Fn(&Monitor<S>) + Send + Sync + 'static,
    {
        self.shared.state.lock().consumers.when_unreachable = Some(Arc::new(callback));
    }

    /// Registers a delegate. Only a weak reference is kept.
    pub fn set_delegate<D>(&self, delegate: &Arc<D>)
    where
        D: ReachabilityDelegate<S> + 'static,
    {
        self.shared.state.lock().consumers.delegate = Some(downgrade_delegate(delegate));
    }

    pub fn clear_delegate(&self) {
        self.shared.state.lock().consumers.delegate = None;
    }

    /// Attaches a subscriber to this monitor.
    ///
    /// The subscriber sees updates detected after this call. If the monitor
    /// already failed it is completed with the stored failure, and if it is
    /// stopped it is finished. Either completion runs on the delivery queue.
    pub fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
    where
        Sub: Subscriber<S::Status>,
    {
        let sink = Arc::new(SubjectSink::new(subscriber));

        let mut state = self.shared.state.lock();
        let completion = if state.stopped {
            Some(Completion::Finished)
        } else if let Some(err) = state.holder.error() {
            Some(Completion::Failure(err.clone().into()))
        } else {
            state.sinks.push(Arc::clone(&sink));
            None
        };
        drop(state);

        if let Some(completion) = completion {
            let late = Arc::clone(&sink);
            self.shared
                .options
                .queue
                .dispatch(move || late.complete(completion));
        }
        Subscription::new(sink, None)
    }

    /// Stream of updates, starting with the latest one if any.
    ///
    /// The stream does not keep the monitor alive. It ends after yielding a
    /// failure, and once the monitor is stopped or released.
    pub fn updates(&self) -> StatusStream<S> {
        StatusStream::new(None, self.shared.subscribe_updates())
    }

    /// Tears the primitive down. Later callbacks, refreshes and setters have
    /// no effect. Idempotent, and implied by dropping the last handle.
    pub fn stop(&self) {
        self.shared.shutdown();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().stopped
    }

    pub fn downgrade(&self) -> WeakMonitor<S> {
        WeakMonitor {
            id: self.shared.id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn ptr_eq(&self, other: &Monitor<S>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Monitor<FlagsSource> {
    pub fn builder(
        provider: Arc<dyn ReachabilityProvider>,
        target: ReachabilityTarget,
    ) -> MonitorBuilder<FlagsSource> {
        MonitorBuilder::flags(provider, target)
    }

    /// Monitors the default route.
    pub fn general(provider: Arc<dyn ReachabilityProvider>) -> Result<Self> {
        Self::builder(provider, ReachabilityTarget::General).build()
    }

    pub fn host(provider: Arc<dyn ReachabilityProvider>, name: impl Into<String>) -> Result<Self> {
        Self::builder(provider, ReachabilityTarget::Host(name.into())).build()
    }

    pub fn address(provider: Arc<dyn ReachabilityProvider>, address: SocketAddr) -> Result<Self> {
        Self::builder(provider, ReachabilityTarget::Address(address)).build()
    }

    pub fn from_config(config: &CoreConfig, target: ReachabilityTarget) -> Result<Self> {
        MonitorBuilder::flags_from_config(config, target).build()
    }

    pub fn flags(&self) -> Option<ReachabilityFlags> {
        self.current_facts()
    }

    /// Compact description of the last observed flags, e.g. `"-R -------"`.
    pub fn flags_description(&self) -> String {
        self.flags().unwrap_or_default().to_string()
    }
}

impl Monitor<PathSource> {
    pub fn builder(
        provider: Arc<dyn PathMonitorProvider>,
        target: PathTarget,
    ) -> MonitorBuilder<PathSource> {
        MonitorBuilder::path(provider, target)
    }

    /// Monitors every interface.
    pub fn general(provider: Arc<dyn PathMonitorProvider>) -> Result<Self> {
        Self::builder(provider, PathTarget::General).build()
    }

    pub fn requiring(provider: Arc<dyn PathMonitorProvider>, interface: InterfaceType) -> Result<Self> {
        Self::builder(provider, PathTarget::Required(interface)).build()
    }

    pub fn prohibiting(
        provider: Arc<dyn PathMonitorProvider>,
        interfaces: Vec<InterfaceType>,
    ) -> Result<Self> {
        Self::builder(provider, PathTarget::Prohibited(interfaces)).build()
    }

    pub fn from_config(config: &CoreConfig, target: PathTarget) -> Result<Self> {
        MonitorBuilder::path_from_config(config, target).build()
    }

    pub fn path(&self) -> Option<NetworkPath> {
        self.current_facts()
    }
}

/// Non-owning monitor handle.
pub struct WeakMonitor<S: Source> {
    id: MonitorId,
    shared: Weak<Shared<S>>,
}

impl<S: Source> Clone for WeakMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<S: Source> fmt::Debug for WeakMonitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakMonitor")
            .field("id", &self.id)
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl<S: Source> WeakMonitor<S> {
    pub fn id(&self) -> MonitorId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Monitor<S>> {
        self.shared.upgrade().map(|shared| Monitor { shared })
    }
}

/// Configures and creates monitors.
///
/// A builder can create any number of independent monitors: [`build`] for a
/// long-lived one, [`stream`] and [`next_status`] for private ones scoped to
/// a single consumer, and [`into_publisher`] for one per subscriber.
///
/// [`build`]: MonitorBuilder::build
/// [`stream`]: MonitorBuilder::stream
/// [`next_status`]: MonitorBuilder::next_status
/// [`into_publisher`]: MonitorBuilder::into_publisher
pub struct MonitorBuilder<S: Source> {
    factory: SourceFactory<S>,
    options: MonitorOptions,
    consumers: Consumers<S>,
}

impl<S: Source> Clone for MonitorBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            options: self.options.clone(),
            consumers: self.consumers.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for MonitorBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorBuilder")
            .field("options", &self.options)
            .field("has_handler", &self.consumers.handler.is_some())
            .field("has_delegate", &self.consumers.delegate.is_some())
            .finish()
    }
}

impl MonitorBuilder<FlagsSource> {
    pub fn flags(provider: Arc<dyn ReachabilityProvider>, target: ReachabilityTarget) -> Self {
        Self::new(FlagsSource::factory(provider, target))
    }

    /// Uses the config's flags primitive, delivery queue and cellular policy.
    pub fn flags_from_config(config: &CoreConfig, target: ReachabilityTarget) -> Self {
        Self::new(FlagsSource::factory(
            Arc::clone(&config.reachability_provider),
            target,
        ))
        .options(MonitorOptions::from_config(config))
    }
}

impl MonitorBuilder<PathSource> {
    pub fn path(provider: Arc<dyn PathMonitorProvider>, target: PathTarget) -> Self {
        Self::new(PathSource::factory(provider, target))
    }

    /// Uses the config's path primitive, delivery queue and cellular policy.
    pub fn path_from_config(config: &CoreConfig, target: PathTarget) -> Self {
        Self::new(PathSource::factory(Arc::clone(&config.path_provider), target))
            .options(MonitorOptions::from_config(config))
    }
}

impl<S: Source> MonitorBuilder<S> {
    pub fn new(factory: SourceFactory<S>) -> Self {
        Self {
            factory,
            options: MonitorOptions::default(),
            consumers: Consumers::default(),
        }
    }

    pub fn options(mut self, options: MonitorOptions) -> Self {
        self.options = options;
        self
    }

    /// Default: the process main queue.
    pub fn queue(mut self, queue: DeliveryQueue) -> Self {
        self.options.queue = queue;
        self
    }

    /// Default: `true`
    pub fn allows_cellular(mut self, allows: bool) -> Self {
        self.options.policy.allows_cellular = allows;
        self
    }

    /// Default: the process-wide center.
    pub fn notification_center(mut self, center: NotificationCenter<MonitorRef>) -> Self {
        self.options.center = center;
        self
    }

    pub fn on_update<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Monitor<S>, StatusUpdate<S::Status>) + Send + Sync + 'static,
    {
        self.consumers.handler = Some(Arc::new(handler));
        self
    }

    pub fn when_reachable<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Monitor<S>) + Send + Sync + 'static,
    {
        self.consumers.when_reachable = Some(Arc::new(callback));
        self
    }

    pub fn when_unreachable<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Monitor<S>) + Send + Sync + 'static,
    {
        self.consumers.when_unreachable = Some(Arc::new(callback));
        self
    }

    pub fn delegate<D>(mut self, delegate: &Arc<D>) -> Self
    where
        D: ReachabilityDelegate<S> + 'static,
    {
        self.consumers.delegate = Some(downgrade_delegate(delegate));
        self
    }

    /// Creates the primitive handle and starts monitoring.
    ///
    /// Consumers configured on the builder see the initial status.
    ///
    /// # Errors
    ///
    /// Fails if the primitive cannot create a handle for the target. Later
    /// failures are delivered through the monitor's channels instead.
    pub fn build(&self) -> Result<Monitor<S>> {
        self.launch(self.consumers.clone(), None, Vec::new())
    }

    /// Stream backed by a private monitor that lives as long as the stream.
    pub fn stream(&self) -> Result<StatusStream<S>> {
        let monitor = self.launch(self.consumers.clone(), None, Vec::new())?;
        let receiver = monitor.shared.subscribe_updates();
        Ok(StatusStream::new(Some(monitor), receiver))
    }

    /// Publisher creating one private monitor per subscriber.
    ///
    /// Consumers configured on the builder are not carried over.
    pub fn into_publisher(self) -> StatusPublisher<S> {
        StatusPublisher::new(Self {
            factory: self.factory,
            options: self.options,
            consumers: Consumers::default(),
        })
    }

    fn launch(
        &self,
        consumers: Consumers<S>,
        continuation: Option<Continuation<S::Status>>,
        sinks: Vec<Arc<SubjectSink<S::Status>>>,
    ) -> Result<Monitor<S>> {
        let source = (self.factory)().map_err(|err| {
            warn!(error = %err, "Failed to create reachability handle");
            ReachabilityError::from(err)
        })?;
        Ok(Monitor::launch(
            source,
            self.options.clone(),
            consumers,
            continuation,
            sinks,
        ))
    }

    pub(crate) fn launch_private(
        &self,
        continuation: Option<Continuation<S::Status>>,
        sinks: Vec<Arc<SubjectSink<S::Status>>>,
    ) -> Result<Monitor<S>> {
        self.launch(Consumers::default(), continuation, sinks)
    }
}
