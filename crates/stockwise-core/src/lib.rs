//! Core abstractions for stockwise
//!
//! This crate defines the types shared by the analysis pipeline: the
//! execution [`Context`] threaded through every outbound call, and the
//! cancellation primitives used to abort a run.

pub mod cancellation;
pub mod context;
pub mod error;

pub use cancellation::{CancellationSource, CancellationToken};
pub use context::Context;
pub use error::{Error, Result};
