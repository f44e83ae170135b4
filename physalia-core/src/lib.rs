//! Shared primitives for the Physalia sequence-network toolkit.
//!
//! `physalia-core` provides the foundation the other Physalia crates build
//! on:
//!
//! - **Error types** — [`PhysaliaError`] and [`Result`] for structured
//!   error handling across the alignment and tree crates

pub mod error;

pub use error::{PhysaliaError, Result};
