use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle position of a ticket at a given instant.
///
/// `Exhausted` and `Expired` both refuse redemption; they are kept apart for
/// logs and client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Active,
    Exhausted,
    Expired,
}

/// Why a redemption was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionRefusal {
    Expired,
    Exhausted,
}

/// Outcome of a conditional use-count increment.
#[derive(Debug, Clone, PartialEq)]
pub enum Redemption {
    Redeemed(DownloadTicket),
    Refused(RedemptionRefusal),
}

/// A time- and use-limited capability to obtain download URLs for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTicket {
    pub ticket_id: String,
    pub order_id: String,
    pub storage_key: String,
    pub expires_at: DateTime<Utc>,
    pub use_limit: u32,
    pub use_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DownloadTicket {
    /// Expiry wins over exhaustion when both hold.
    pub fn state(&self, now: DateTime<Utc>) -> TicketState {
        if now >= self.expires_at {
            TicketState::Expired
        } else if self.use_count >= self.use_limit {
            TicketState::Exhausted
        } else {
            TicketState::Active
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == TicketState::Active
    }

    pub fn is_unexpired(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn remaining_uses(&self) -> u32 {
        self.use_limit.saturating_sub(self.use_count)
    }

    /// Checks both limits and counts one use if they hold.
    pub fn redeem(&mut self, now: DateTime<Utc>) -> Result<(), RedemptionRefusal> {
        match self.state(now) {
            TicketState::Expired => Err(RedemptionRefusal::Expired),
            TicketState::Exhausted => Err(RedemptionRefusal::Exhausted),
            TicketState::Active => {
                self.use_count += 1;
                self.last_used_at = Some(now);
                Ok(())
            }
        }
    }
}

/// Outcome of looking up the current ticket for an order, minting one when
/// there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketIssue {
    Reused(DownloadTicket),
    Minted(DownloadTicket),
}

/// Params for minting a ticket.
#[derive(Debug, Clone)]
pub struct TicketCreate {
    pub order_id: String,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub use_limit: u32,
}

/// Tickets bound to one order, optionally only those still unexpired at an instant.
#[derive(Debug, Clone)]
pub struct TicketFilter {
    pub order_id: String,
    pub unexpired_at: Option<DateTime<Utc>>,
}

impl TicketFilter {
    pub fn accepts(&self, ticket: &DownloadTicket) -> bool {
        ticket.order_id == self.order_id
            && self.unexpired_at.map_or(true, |now| ticket.is_unexpired(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(now: DateTime<Utc>, use_count: u32) -> DownloadTicket {
        DownloadTicket {
            ticket_id: "ticket-1".into(),
            order_id: "order-1".into(),
            storage_key: "datasets/a.csv".into(),
            expires_at: now + Duration::minutes(10),
            use_limit: 3,
            use_count,
            last_used_at: None,
            created_at: now,
        }
    }

    #[test]
    fn expired_ticket_refused_with_uses_left() {
        let now = Utc::now();
        let mut ticket = ticket(now, 0);
        let later = now + Duration::minutes(10);
        assert_eq!(ticket.state(later), TicketState::Expired);
        assert_eq!(ticket.redeem(later), Err(RedemptionRefusal::Expired));
        assert_eq!(ticket.use_count, 0);
    }

    #[test]
    fn exhausted_ticket_refused_with_time_left() {
        let now = Utc::now();
        let mut ticket = ticket(now, 3);
        assert_eq!(ticket.state(now), TicketState::Exhausted);
        assert_eq!(ticket.redeem(now), Err(RedemptionRefusal::Exhausted));
        assert_eq!(ticket.use_count, 3);
    }

    #[test]
    fn redeem_counts_and_stamps() {
        let now = Utc::now();
        let mut ticket = ticket(now, 2);
        ticket.redeem(now).unwrap();
        assert_eq!(ticket.use_count, 3);
        assert_eq!(ticket.remaining_uses(), 0);
        assert_eq!(ticket.last_used_at, Some(now));
        assert!(!ticket.is_usable(now));
    }
}
