//! Catalog entries resolving a product to its stored blob.

pub mod entity;
pub mod error;

pub use error::*;
