pub mod order;
pub mod product;
pub mod ticket;
pub mod download_log;

pub use order::*;
pub use product::*;
pub use ticket::*;
pub use download_log::*;
