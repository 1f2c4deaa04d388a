//! Bounded worker pool for inbound events.
//!
//! One receiver (the transport's polling loop) pushes events into a bounded
//! queue through a [`QueueHandle`]; N workers drain it concurrently. Each
//! event is handled inside a failure-isolation boundary: an error or a panic
//! is logged with its request id and the worker moves on; one bad event
//! never halts the pool. Shutdown is cooperative: intake stops first, the
//! buffered queue is drained, and in-flight handlers run to completion.
//!
//! There is no per-event timeout; a slow backend call occupies its worker for
//! the duration. Throughput is bounded by backend latency × pool size.

pub mod dispatcher;
pub mod error;

pub use {
    dispatcher::{Dispatcher, EventHandler, QueueHandle},
    error::{Error, Result},
};
