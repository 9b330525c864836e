//! Append-only download audit trail.

pub mod entity;
pub mod error;

pub use error::*;
