//! Map callback-data payloads to commands.
//!
//! Every inline keyboard button carries an ASCII callback-data string built
//! from a fixed vocabulary: either an exact token (`book_appointment`) or a
//! prefix followed by a parameter (`select_date_2024-05-01`). The
//! [`CallbackRouter`] resolves a payload to a [`Command`] plus the parameter
//! remainder. Resolution order:
//!
//! 1. exact match (constant-time map lookup)
//! 2. prefix scan in registration order; the first registered prefix that
//!    matches wins
//!
//! Routes resolve to a tagged [`Command`] rather than closures so the
//! dispatch table over it is checked for coverage at compile time. The table
//! is built once at startup and never mutates, so lookups take no lock.

pub mod command;
pub mod patterns;
pub mod router;

pub use {
    command::Command,
    router::{CallbackRouter, Match},
};
