//! Download tickets, including the conditional redemption that keeps
//! `use_count` within `use_limit`.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
