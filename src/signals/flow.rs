//! Flow - Derived pipelines over sequence-valued signals.
//!
//! Each stage (`filter`, `map`, `sort`) owns a derived signal and exactly one
//! subscription to its upstream. The derived value is always
//! `transform(upstream)`: computed when the stage is built and recomputed on
//! every upstream notification. Stages chain:
//!
//! ```
//! use spark_dom::signals::{flow, signal};
//!
//! let numbers = signal(vec![5, 2, 8, 1]);
//! let evens_sorted = flow(&numbers)
//!     .filter(|n| n % 2 == 0)
//!     .sort(|a, b| a.cmp(b));
//!
//! assert_eq!(evens_sorted.value(), vec![2, 8]);
//! numbers.set(vec![4, 3, 0]);
//! assert_eq!(evens_sorted.value(), vec![0, 4]);
//!
//! // Release every stage's upstream subscription.
//! evens_sorted.dispose();
//! ```
//!
//! # Leniency
//!
//! The source only has to be [`Sequence`]-like. When its current value is not
//! a sequence (`None`, a JSON object, ...) the stage sees an empty sequence
//! instead of failing.
//!
//! # Ownership
//!
//! A flow keeps the handles of every stage in its chain. `dispose()` releases
//! them all; a component that owns the flow releases them on destroy.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use super::signal::{signal, Observable, ReadSignal, Signal};
use super::subscription::Subscription;

// =============================================================================
// Sequence
// =============================================================================

/// A value that may hold a sequence of items.
pub trait Sequence {
    type Item: Clone + 'static;

    /// The items, or `None` when the value is not a sequence.
    fn as_items(&self) -> Option<&[Self::Item]>;
}

impl<T: Clone + 'static> Sequence for Vec<T> {
    type Item = T;

    fn as_items(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

impl<T: Clone + 'static> Sequence for Option<Vec<T>> {
    type Item = T;

    fn as_items(&self) -> Option<&[T]> {
        self.as_deref()
    }
}

impl Sequence for Value {
    type Item = Value;

    fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// A pipeline stage wrapping a (derived) signal.
pub struct Flow<S> {
    source: ReadSignal<S>,
    stages: Vec<Subscription>,
}

/// Start a pipeline over `source`.
pub fn flow<S>(source: &Signal<S>) -> Flow<S>
where
    S: Sequence + Clone + PartialEq + 'static,
{
    Flow::new(source.read_only())
}

impl<S> Clone for Flow<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            stages: self.stages.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Flow<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("source", &self.source)
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl<S> Flow<S>
where
    S: Sequence + Clone + PartialEq + 'static,
{
    /// Wrap an existing signal. The resulting flow owns no subscriptions yet.
    pub fn new(source: ReadSignal<S>) -> Self {
        Self {
            source,
            stages: Vec::new(),
        }
    }

    /// Keep only the items matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&S::Item) -> bool + 'static) -> Flow<Vec<S::Item>>
    where
        S::Item: PartialEq,
    {
        self.derive(move |items| {
            items
                .iter()
                .filter(|item| predicate(item))
                .cloned()
                .collect()
        })
    }

    /// Transform every item.
    pub fn map<U>(&self, mapper: impl Fn(&S::Item) -> U + 'static) -> Flow<Vec<U>>
    where
        U: Clone + PartialEq + 'static,
    {
        self.derive(move |items| items.iter().map(&mapper).collect())
    }

    /// Stable sort of a copy of the items. The upstream value is never touched.
    pub fn sort(
        &self,
        compare: impl Fn(&S::Item, &S::Item) -> Ordering + 'static,
    ) -> Flow<Vec<S::Item>>
    where
        S::Item: PartialEq,
    {
        self.derive(move |items| {
            let mut sorted = items.to_vec();
            sorted.sort_by(|a, b| compare(a, b));
            sorted
        })
    }

    fn derive<U>(&self, transform: impl Fn(&[S::Item]) -> Vec<U> + 'static) -> Flow<Vec<U>>
    where
        U: Clone + PartialEq + 'static,
    {
        let apply = move |value: &S| value.as_items().map_or_else(Vec::new, &transform);

        // Filled by the subscription's replay, so the transform runs once
        // per upstream value. Transforms see a clone and may read the source.
        let derived = signal(Vec::new());
        let target = derived.clone();
        let upstream = self.source.subscribe(move |value| target.set(apply(value)));

        let mut stages = self.stages.clone();
        stages.push(upstream);

        Flow {
            source: derived.read_only(),
            stages,
        }
    }
}

impl<S: Clone + PartialEq + 'static> Flow<S> {
    /// Current value of this stage.
    pub fn value(&self) -> S {
        self.source.get()
    }

    /// Read-only signal of this stage.
    pub fn signal(&self) -> ReadSignal<S> {
        self.source.clone()
    }

    /// Subscribe to this stage (replays the current value).
    pub fn subscribe(&self, callback: impl Fn(&S) + 'static) -> Subscription {
        self.source.subscribe(callback)
    }

    /// Upstream subscriptions of every stage in the chain, oldest first.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.stages
    }

    /// Release every stage's upstream subscription. Idempotent.
    pub fn dispose(&self) {
        for stage in &self.stages {
            stage.unsubscribe();
        }
    }
}

impl<S: Clone + PartialEq + 'static> Observable<S> for Flow<S> {
    fn current(&self) -> S {
        self.value()
    }

    fn observe(&self, callback: Box<dyn Fn(&S)>) -> Subscription {
        self.source.observe(callback)
    }
}

// =============================================================================
// Tests
// =============================================================================
