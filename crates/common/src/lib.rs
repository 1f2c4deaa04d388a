//! Shared types used across all bookline crates.

pub mod request;
pub mod types;

pub use {request::RequestContext, types::Event};
