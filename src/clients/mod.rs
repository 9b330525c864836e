//! Typed, instrumented handles over the resource actors.

#[macro_use]
mod macros;
mod order_client;
mod ticket_client;
mod product_client;
mod log_client;

pub use order_client::OrderClient;
pub use ticket_client::TicketClient;
pub use product_client::ProductClient;
pub use log_client::LogClient;
