//! Rate limiting wrappers for event callbacks.
//!
//! Both wrappers are generic over a [`Timers`] source so the same code runs on
//! `gloo-timers` in the browser and on a manual clock in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;

/// Something that can run a callback after a delay.
///
/// Dropping the returned handle cancels the callback. Use [`Timers::detach`]
/// for fire-and-forget work.
pub trait Timers: Clone + 'static {
    type Handle: 'static;

    fn after(&self, millis: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;

    fn detach(&self, handle: Self::Handle);

    fn spawn_after(&self, millis: u32, callback: Box<dyn FnOnce()>) {
        let handle = self.after(millis, callback);
        self.detach(handle);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimers;

impl Timers for BrowserTimers {
    type Handle = Timeout;

    fn after(&self, millis: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(millis, callback)
    }

    fn detach(&self, handle: Timeout) {
        handle.forget();
    }
}

/// Trailing debounce: the callback runs once `wait` ms after the last call.
pub struct Debounced<A: 'static, T: Timers> {
    timers: T,
    wait: u32,
    callback: Rc<dyn Fn(A)>,
    pending: RefCell<Option<T::Handle>>,
}

pub fn debounce<A, T, F>(timers: T, wait: u32, callback: F) -> Debounced<A, T>
where
    A: 'static,
    T: Timers,
    F: Fn(A) + 'static,
{
    Debounced {
        timers,
        wait,
        callback: Rc::new(callback),
        pending: RefCell::new(None),
    }
}

impl<A: 'static, T: Timers> Debounced<A, T> {
    pub fn call(&self, arg: A) {
        let callback = self.callback.clone();
        let handle = self.timers.after(self.wait, Box::new(move || callback(arg)));
        // Replacing the handle drops (and so cancels) the superseded timer.
        self.pending.replace(Some(handle));
    }
}

/// Leading throttle: runs immediately, then ignores calls for `limit` ms.
pub struct Throttled<A: 'static, T: Timers> {
    timers: T,
    limit: u32,
    callback: Box<dyn Fn(A)>,
    blocked: Rc<Cell<bool>>,
    reset: RefCell<Option<T::Handle>>,
}

pub fn throttle<A, T, F>(timers: T, limit: u32, callback: F) -> Throttled<A, T>
where
    A: 'static,
    T: Timers,
    F: Fn(A) + 'static,
{
    Throttled {
        timers,
        limit,
        callback: Box::new(callback),
        blocked: Rc::new(Cell::new(false)),
        reset: RefCell::new(None),
    }
}

impl<A: 'static, T: Timers> Throttled<A, T> {
    /// Returns whether the callback actually ran.
    pub fn call(&self, arg: A) -> bool {
        if self.blocked.get() {
            return false;
        }
        (self.callback)(arg);
        self.blocked.set(true);
        let blocked = self.blocked.clone();
        let handle = self
            .timers
            .after(self.limit, Box::new(move || blocked.set(false)));
        self.reset.replace(Some(handle));
        true
    }
}
