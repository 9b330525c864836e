//! Order records. Orders are immutable once recorded.

pub mod entity;
pub mod error;

pub use error::*;
