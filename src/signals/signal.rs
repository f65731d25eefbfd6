//! Signal - A single mutable observable cell with synchronous push notification.
//!
//! # Semantics
//!
//! - `set` with a value equal to the current one is a no-op (no notification).
//! - Every accepted `set` invokes all subscribers synchronously, in the order
//!   they subscribed.
//! - `subscribe` invokes the callback once with the current value before it
//!   returns the [`Subscription`].
//!
//! # Notification passes
//!
//! A pass iterates a snapshot of the subscriber list taken when the pass
//! starts. Subscribers added during a pass are not called by that pass.
//! Subscribers removed during a pass are skipped if they have not been
//! reached yet.
//!
//! A `set` on a signal that is already notifying stores the new value and is
//! deferred: the running pass finishes delivering its value, then exactly one
//! more pass delivers the latest value. The last value every subscriber sees
//! is always the signal's final value.
//!
//! Nothing here is batched across signals. Two signals updated one after the
//! other notify independently, so a subscriber of the first can observe the
//! second in its old state.
//!
//! # Example
//!
//! ```
//! use spark_dom::signals::signal;
//!
//! let count = signal(0);
//! let sub = count.subscribe(|v| println!("count = {v}"));
//!
//! count.set(1);
//! count.update(|v| v + 1);
//! assert_eq!(count.get(), 2);
//!
//! sub.unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::subscription::Subscription;

// =============================================================================
// Observable - the seam shared by signals, read-only views and flows
// =============================================================================

/// Anything that has a current value and can push changes to a callback.
///
/// Implemented by [`Signal`], [`ReadSignal`] and
/// [`Flow`](super::flow::Flow), so watch/bind helpers accept all three.
pub trait Observable<T: 'static> {
    /// Clone of the current value.
    fn current(&self) -> T;

    /// Subscribe with replay-on-subscribe semantics.
    fn observe(&self, callback: Box<dyn Fn(&T)>) -> Subscription;
}

// =============================================================================
// Signal
// =============================================================================

struct Subscriber<T> {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&T)>,
}

struct SignalInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Rc<Subscriber<T>>>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    pending: Cell<bool>,
}

/// Resets the notifying flags even if a subscriber panics.
struct PassGuard<'a> {
    notifying: &'a Cell<bool>,
    pending: &'a Cell<bool>,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.notifying.set(false);
        self.pending.set(false);
    }
}

impl<T: Clone + 'static> SignalInner<T> {
    fn notify(&self) {
        if self.notifying.get() {
            tracing::debug!("re-entrant set deferred until the current pass completes");
            self.pending.set(true);
            return;
        }

        self.notifying.set(true);
        let _guard = PassGuard {
            notifying: &self.notifying,
            pending: &self.pending,
        };

        let mut passes = 0usize;
        loop {
            self.pending.set(false);
            passes += 1;

            let value = self.value.borrow().clone();
            let snapshot: Vec<Rc<Subscriber<T>>> = self.subscribers.borrow().clone();
            tracing::trace!(subscribers = snapshot.len(), pass = passes, "signal notify");

            for subscriber in snapshot {
                if subscriber.active.get() {
                    (subscriber.callback)(&value);
                }
            }

            if !self.pending.get() {
                break;
            }
        }
    }
}

/// A mutable observable value.
///
/// Cloning a `Signal` creates a new handle to the **same** cell.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

/// Create a signal holding `value`.
pub fn signal<T: Clone + PartialEq + 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                notifying: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    /// Clone of the current value. No side effects.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls `set` on this same signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value` and notify subscribers, unless it equals the current value.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.inner.notify();
    }

    /// Store `value` and notify even if it equals the current value.
    pub(crate) fn replace(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.notify();
    }

    /// `set(f(current))`. A panic in `f` reaches the caller with the value unchanged.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let current = self.get();
        self.set(f(&current));
    }

    /// Like [`update`](Self::update) for fallible transforms.
    ///
    /// On `Err` the value is left untouched and the error is returned.
    pub fn try_update<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
        let current = self.get();
        self.set(f(&current)?);
        Ok(())
    }

    /// Add a subscriber and immediately call it with the current value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_boxed(Box::new(callback))
    }

    fn subscribe_boxed(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let subscriber = Rc::new(Subscriber {
            id,
            active: Cell::new(true),
            callback,
        });
        self.inner.subscribers.borrow_mut().push(Rc::clone(&subscriber));

        let value = self.get();
        (subscriber.callback)(&value);

        let weak_inner = Rc::downgrade(&self.inner);
        let weak_subscriber = Rc::downgrade(&subscriber);
        Subscription::from_fn(move || {
            if let Some(subscriber) = weak_subscriber.upgrade() {
                subscriber.active.set(false);
            }
            if let Some(inner) = weak_inner.upgrade() {
                inner.subscribers.borrow_mut().retain(|s| s.id != id);
            }
        })
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Read-only view over this signal.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            signal: self.clone(),
        }
    }

    /// Whether two handles point at the same cell.
    pub fn ptr_eq(&self, other: &Signal<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> for Signal<T> {
    fn current(&self) -> T {
        self.get()
    }

    fn observe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        self.subscribe_boxed(callback)
    }
}

// =============================================================================
// ReadSignal
// =============================================================================

/// A signal that can be read and subscribed to but not set.
///
/// Derived values hand these out so only their owner writes them.
pub struct ReadSignal<T> {
    signal: Signal<T>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadSignal").field(&self.signal).finish()
    }
}

impl<T: Clone + PartialEq + 'static> ReadSignal<T> {
    pub fn get(&self) -> T {
        self.signal.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.signal.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.signal.subscriber_count()
    }

    pub fn ptr_eq(&self, other: &ReadSignal<T>) -> bool {
        self.signal.ptr_eq(&other.signal)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for ReadSignal<T> {
    fn from(signal: Signal<T>) -> Self {
        ReadSignal { signal }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> for ReadSignal<T> {
    fn current(&self) -> T {
        self.get()
    }

    fn observe(&self, callback: Box<dyn Fn(&T)>) -> Subscription {
        self.signal.subscribe_boxed(callback)
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Evaluate `f` once and expose the result as a read-only signal.
///
/// This does not track dependencies; use a [`Flow`](super::flow::Flow) or a
/// `watch` callback to keep a value derived over time.
pub fn compute<T: Clone + PartialEq + 'static>(f: impl FnOnce() -> T) -> ReadSignal<T> {
    signal(f()).read_only()
}

/// Subscribe `callback` to `source`. Same as `source.subscribe(callback)`.
pub fn watch<T: 'static>(
    source: &impl Observable<T>,
    callback: impl Fn(&T) + 'static,
) -> Subscription {
    source.observe(Box::new(callback))
}

// =============================================================================
// Tests
// =============================================================================
