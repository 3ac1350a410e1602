//! # Notification Center
//!
//! Process-wide broadcast of named notifications using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Code that cannot hold a direct reference to a producer can still observe it
//! through a [`NotificationCenter`]: producers [`post`](NotificationCenter::post)
//! a [`Notification`] carrying a name and an `object` payload, observers
//! [`observe`](NotificationCenter::observe) a name and receive every matching
//! notification posted after they subscribed.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    post     ┌──────────────┐   observe(name)   ┌──────────┐
//! │ Monitor A ├────────────>│              ├──────────────────>│ Observer │
//! └───────────┘             │ Notification │                   └──────────┘
//! ┌───────────┐    post     │    Center    │   observe(name)   ┌──────────┐
//! │ Monitor B ├────────────>│  (broadcast) ├──────────────────>│ Observer │
//! └───────────┘             └──────────────┘                   └──────────┘
//! ```
//!
//! ## Delivery Semantics
//!
//! - **No replay**: observers only see notifications posted after they
//!   subscribed.
//! - **Most recent wins**: an observer that falls more than `capacity`
//!   notifications behind skips ahead to the newest ones instead of failing.
//!   [`NotificationStream::recv`] handles `RecvError::Lagged` internally.
//! - **Closed**: `recv` returns `None` once every center handle is dropped.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{NotificationCenter, NotificationName};
//!
//! const PLAYGROUND: NotificationName = NotificationName::new("Playground");
//!
//! # #[tokio::main]
//! # async fn main() {
//! let center: NotificationCenter<u32> = NotificationCenter::new(16);
//! let mut observer = center.observe(PLAYGROUND);
//!
//! center.post(PLAYGROUND, 7);
//! let notification = observer.recv().await.unwrap();
//! assert_eq!(notification.object, 7);
//! # }
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

pub use tokio::sync::broadcast::error::RecvError;

/// Default buffer size for a notification center.
///
/// Observers that fall further behind skip to the most recent notifications.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Name notifications are posted and observed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationName(&'static str);

impl NotificationName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for NotificationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A posted notification.
#[derive(Debug, Clone)]
pub struct Notification<T> {
    pub name: NotificationName,
    /// The object that posted the notification.
    pub object: T,
    pub posted_at: DateTime<Utc>,
}

/// Broadcast bus for named notifications.
///
/// Cloning the center yields another handle to the same bus.
#[derive(Clone)]
pub struct NotificationCenter<T> {
    sender: broadcast::Sender<Notification<T>>,
}

impl<T> NotificationCenter<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a center buffering at most `capacity` notifications per observer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Posts `object` under `name` to every current observer.
    ///
    /// Returns the number of observers that will receive the notification.
    /// Posting with nobody listening is not an error.
    pub fn post(&self, name: NotificationName, object: T) -> usize {
        let notification = Notification {
            name,
            object,
            posted_at: Utc::now(),
        };
        match self.sender.send(notification) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(name = %name, "Notification posted without observers");
                0
            }
        }
    }

    /// Raw receiver for every notification regardless of name.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification<T>> {
        self.sender.subscribe()
    }

    /// Observe notifications posted under `name`.
    pub fn observe(&self, name: NotificationName) -> NotificationStream<T> {
        NotificationStream::new(self.subscribe()).named(name)
    }

    /// Number of live receivers, including unfiltered ones.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> Default for NotificationCenter<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl<T> fmt::Debug for NotificationCenter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("observer_count", &self.sender.receiver_count())
            .finish()
    }
}

/// Type alias for notification filter functions.
type ObjectFilter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Filtered view over a center's receiver.
pub struct NotificationStream<T> {
    receiver: broadcast::Receiver<Notification<T>>,
    name: Option<NotificationName>,
    filter: Option<ObjectFilter<T>>,
}

impl<T> NotificationStream<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(receiver: broadcast::Receiver<Notification<T>>) -> Self {
        Self {
            receiver,
            name: None,
            filter: None,
        }
    }

    /// Only yield notifications posted under `name`.
    pub fn named(mut self, name: NotificationName) -> Self {
        self.name = Some(name);
        self
    }

    /// Only yield notifications whose object matches `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn matches(&self, notification: &Notification<T>) -> bool {
        if let Some(name) = self.name {
            if notification.name != name {
                return false;
            }
        }
        match &self.filter {
            Some(filter) => filter(&notification.object),
            None => true,
        }
    }

    /// Next matching notification, or `None` once the center is gone.
    pub async fn recv(&mut self) -> Option<Notification<T>> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if self.matches(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    trace!(skipped, "Observer lagged, skipping to newest notifications");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching notification that is already buffered.
    pub fn try_recv(&mut self) -> Option<Notification<T>> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) if self.matches(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }
}

impl<T> fmt::Debug for NotificationStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationStream")
            .field("name", &self.name)
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
