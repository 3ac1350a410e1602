//! Test doubles for the reachability primitives.
//!
//! The mocks capture the callback a monitor registers so tests can play the
//! role of the operating system and fire events at will.

#![allow(dead_code)]

use bridge_traits::error::Result;
use bridge_traits::{
    BridgeError, FlagsCallback, NetworkPath, PathCallback, PathMonitorHandle,
    PathMonitorProvider, PathTarget, ReachabilityFlags, ReachabilityHandle, ReachabilityProvider,
    ReachabilityTarget,
};
use core_reachability::{Completion, Demand, Subscriber};
use mockall::mock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
    pub FlagsHandle {}

    impl ReachabilityHandle for FlagsHandle {
        fn set_callback(&mut self, callback: Option<FlagsCallback>) -> Result<()>;
        fn schedule_delivery(&mut self) -> Result<()>;
        fn current_flags(&self) -> Result<ReachabilityFlags>;
        fn teardown(&mut self);
    }
}

mock! {
    pub FlagsProvider {}

    impl ReachabilityProvider for FlagsProvider {
        fn create(&self, target: &ReachabilityTarget) -> Result<Box<dyn ReachabilityHandle>>;
    }
}

mock! {
    pub PathHandle {}

    impl PathMonitorHandle for PathHandle {
        fn start(&mut self, on_update: PathCallback) -> Result<()>;
        fn current_path(&self) -> Option<NetworkPath>;
        fn cancel(&mut self);
    }
}

mock! {
    pub PathProvider {}

    impl PathMonitorProvider for PathProvider {
        fn create(&self, target: &PathTarget) -> Result<Box<dyn PathMonitorHandle>>;
    }
}

pub fn reachable() -> ReachabilityFlags {
    ReachabilityFlags::REACHABLE
}

pub fn cellular() -> ReachabilityFlags {
    ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN
}

pub fn offline() -> ReachabilityFlags {
    ReachabilityFlags::empty()
}

/// Fake flags primitive shared by every handle it creates.
#[derive(Clone)]
pub struct FakeFlagsOs {
    callbacks: Arc<Mutex<Vec<FlagsCallback>>>,
    flags: Arc<Mutex<Result<ReachabilityFlags>>>,
    set_callback_result: Arc<Mutex<Result<()>>>,
    schedule_result: Arc<Mutex<Result<()>>>,
    pub created: Arc<AtomicUsize>,
    pub teardowns: Arc<AtomicUsize>,
    pub unset_callbacks: Arc<AtomicUsize>,
}

impl FakeFlagsOs {
    pub fn new(initial: ReachabilityFlags) -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(Vec::new())),
            flags: Arc::new(Mutex::new(Ok(initial))),
            set_callback_result: Arc::new(Mutex::new(Ok(()))),
            schedule_result: Arc::new(Mutex::new(Ok(()))),
            created: Arc::new(AtomicUsize::new(0)),
            teardowns: Arc::new(AtomicUsize::new(0)),
            unset_callbacks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_flags(&self, flags: ReachabilityFlags) {
        *self.flags.lock() = Ok(flags);
    }

    pub fn fail_queries(&self, err: BridgeError) {
        *self.flags.lock() = Err(err);
    }

    pub fn fail_set_callback(&self, err: BridgeError) {
        *self.set_callback_result.lock() = Err(err);
    }

    pub fn fail_scheduling(&self, err: BridgeError) {
        *self.schedule_result.lock() = Err(err);
    }

    /// Changes the flags and invokes every registered callback.
    pub fn fire(&self, flags: ReachabilityFlags) {
        self.set_flags(flags);
        let callbacks = self.callbacks.lock().clone();
        for callback in callbacks {
            callback(flags);
        }
    }

    pub fn registered_callbacks(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Callbacks stay registered here even after teardown, so tests can
    /// deliver late events.
    pub fn fire_stale(&self, flags: ReachabilityFlags) {
        self.fire(flags);
    }

    pub fn handle(&self) -> MockFlagsHandle {
        let mut handle = MockFlagsHandle::new();

        let callbacks = Arc::clone(&self.callbacks);
        let result = Arc::clone(&self.set_callback_result);
        let unset = Arc::clone(&self.unset_callbacks);
        handle.expect_set_callback().returning(move |callback| {
            result.lock().clone()?;
            match callback {
                Some(callback) => callbacks.lock().push(callback),
                None => {
                    unset.fetch_add(1, Ordering::SeqCst);
                }
            }
            Ok(())
        });

        let result = Arc::clone(&self.schedule_result);
        handle
            .expect_schedule_delivery()
            .returning(move || result.lock().clone());

        let flags = Arc::clone(&self.flags);
        handle
            .expect_current_flags()
            .returning(move || flags.lock().clone());

        let teardowns = Arc::clone(&self.teardowns);
        handle.expect_teardown().returning(move || {
            teardowns.fetch_add(1, Ordering::SeqCst);
        });

        handle
    }

    pub fn provider(&self) -> Arc<dyn ReachabilityProvider> {
        let mut provider = MockFlagsProvider::new();
        let os = self.clone();
        provider.expect_create().returning(move |target| {
            if let ReachabilityTarget::Host(name) = target {
                if name.is_empty() {
                    return Err(BridgeError::CreationFailed {
                        target: target.to_string(),
                        code: 22,
                    });
                }
            }
            os.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(os.handle()))
        });
        Arc::new(provider)
    }
}

/// Fake path primitive. Its handles only know a path once one is delivered.
#[derive(Clone)]
pub struct FakePathOs {
    callbacks: Arc<Mutex<Vec<PathCallback>>>,
    path: Arc<Mutex<Option<NetworkPath>>>,
    pub cancels: Arc<AtomicUsize>,
}

impl FakePathOs {
    pub fn new() -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(Vec::new())),
            path: Arc::new(Mutex::new(None)),
            cancels: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fire(&self, path: NetworkPath) {
        *self.path.lock() = Some(path.clone());
        let callbacks = self.callbacks.lock().clone();
        for callback in callbacks {
            callback(path.clone());
        }
    }

    pub fn provider(&self) -> Arc<dyn PathMonitorProvider> {
        let mut provider = MockPathProvider::new();
        let os = self.clone();
        provider.expect_create().returning(move |_| {
            let mut handle = MockPathHandle::new();

            let callbacks = Arc::clone(&os.callbacks);
            handle.expect_start().returning(move |callback| {
                callbacks.lock().push(callback);
                Ok(())
            });

            let path = Arc::clone(&os.path);
            handle
                .expect_current_path()
                .returning(move || path.lock().clone());

            let cancels = Arc::clone(&os.cancels);
            handle.expect_cancel().returning(move || {
                cancels.fetch_add(1, Ordering::SeqCst);
            });

            Ok(Box::new(handle))
        });
        Arc::new(provider)
    }
}

/// Subscriber recording everything it receives.
pub struct Recorder<T> {
    pub values: Arc<Mutex<Vec<T>>>,
    pub completions: Arc<Mutex<Vec<Completion>>>,
    pub initial: Demand,
}

impl<T> Recorder<T> {
    pub fn new(initial: Demand) -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            completions: Arc::new(Mutex::new(Vec::new())),
            initial,
        }
    }

    pub fn handles(&self) -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<Completion>>>) {
        (Arc::clone(&self.values), Arc::clone(&self.completions))
    }
}

impl<T: Send + 'static> Subscriber<T> for Recorder<T> {
    fn initial_demand(&self) -> Demand {
        self.initial
    }

    fn receive(&mut self, value: T) -> Demand {
        self.values.lock().push(value);
        Demand::NONE
    }

    fn receive_completion(&mut self, completion: Completion) {
        self.completions.lock().push(completion);
    }
}
