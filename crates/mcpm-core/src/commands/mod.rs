//! High-level registry operations.
//!
//! These are the calls the CLI and GUI frontends make; each one loads the
//! current registry, applies a single change and saves it back.

pub mod servers;

pub use servers::{ImportReport, ServerCommand, ServerReport};
