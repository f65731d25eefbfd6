//! Signals - Observable state and derived pipelines.
//!
//! - [`Signal`] - A mutable observable cell with synchronous push notification
//! - [`ReadSignal`] - Read-only view, handed out by derived values
//! - [`Subscription`] - Idempotent cancellation handle
//! - [`Flow`] - `filter` / `map` / `sort` pipelines over sequence-valued signals
//!
//! Every signal owns its own subscriber list. There is no global registry,
//! no batching and no scheduler: all notification happens synchronously on
//! the calling thread, inside the call to `set`.

mod flow;
mod signal;
mod subscription;

pub use flow::{flow, Flow, Sequence};
pub use signal::{compute, signal, watch, Observable, ReadSignal, Signal};
pub use subscription::{Cleanup, Subscription};
