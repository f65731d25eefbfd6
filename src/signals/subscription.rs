//! Subscription - Cancellation handle returned by every subscribe.
//!
//! Subscriptions are the only cancellation primitive in the runtime. They are
//! idempotent, cloneable (clones cancel the same registration), and safe to
//! call after the source signal has been dropped.
//!
//! Dropping a `Subscription` does NOT unsubscribe. Owners (components, flows)
//! collect handles and release them explicitly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Cleanup function returned by builders.
///
/// Call this to release whatever the builder registered.
pub type Cleanup = Box<dyn FnOnce()>;

/// Handle that cancels one registration.
#[derive(Clone)]
pub struct Subscription {
    cancel: Rc<RefCell<Option<Cleanup>>>,
}

impl Subscription {
    /// Wrap an arbitrary cancellation function.
    pub fn from_fn(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Rc::new(RefCell::new(Some(Box::new(cancel)))),
        }
    }

    /// A subscription that is already cancelled.
    pub fn empty() -> Self {
        Self {
            cancel: Rc::new(RefCell::new(None)),
        }
    }

    /// Cancel the registration. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        // Take first so the cancel function runs without a borrow held.
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether `unsubscribe` has not been called yet.
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }

    /// Convert into a boxed cleanup function.
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || self.unsubscribe())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_unsubscribe_runs_once() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let sub = Subscription::from_fn(move || count_clone.set(count_clone.get() + 1));

        assert!(sub.is_active());
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(count.get(), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_clones_share_state() {
        let sub = Subscription::from_fn(|| {});
        let other = sub.clone();
        other.unsubscribe();
        assert!(!sub.is_active());
    }

    #[test]
    fn test_into_cleanup() {
        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();
        let cleanup = Subscription::from_fn(move || called_clone.set(true)).into_cleanup();
        cleanup();
        assert!(called.get());
    }

    #[test]
    fn test_empty_is_inactive() {
        let sub = Subscription::empty();
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
