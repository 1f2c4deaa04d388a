//! Per-chat conversation state.
//!
//! A [`Session`] holds one chat's role, current flow step, and the transient
//! selections made across the steps of a single flow. The [`SessionStore`] is
//! the only shared mutable resource in the core; it hands out whole-record
//! copies and replaces whole records, never partial in-place mutations.
//! [`ChatLocks`] serializes all handling for one chat so that a worker's
//! load → mutate → store sequence can never interleave with another worker
//! touching the same chat.

pub mod error;
pub mod guard;
pub mod session;
pub mod store;

pub use {
    error::{Error, Result},
    guard::ChatLocks,
    session::{FlowState, Role, Session},
    store::SessionStore,
};
