use chrono::{DateTime, Utc};
use crate::domain::Redemption;

/// Custom actions for DownloadTicket entities.
#[derive(Debug, Clone)]
pub enum TicketAction {
    /// Counts one use if, at `now`, the ticket is unexpired and has uses left.
    ///
    /// Check and increment run in a single actor turn, so concurrent
    /// redemptions of one ticket are serialised.
    Redeem { now: DateTime<Utc> },
}

/// Results from TicketActions - variants match 1:1 with TicketAction
#[derive(Debug, Clone)]
pub enum TicketActionResult {
    Redeem(Redemption),
}
