//! Shared error types for the bayesmix model core.
//!
//! Every crate in the workspace reports failures through [`Error`], so the
//! external sampling engine sees one taxonomy regardless of which model
//! family raised it.

pub mod error;

pub use error::{Error, ErrorCategory, Result, StructuredError};
