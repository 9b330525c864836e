use crate::actor_framework::Entity;
use crate::domain::{DownloadTicket, Redemption, TicketCreate, TicketFilter};
use super::actions::{TicketAction, TicketActionResult};

impl Entity for DownloadTicket {
    type Id = String;
    type CreateParams = TicketCreate;
    type Patch = ();
    type Action = TicketAction;
    type ActionResult = TicketActionResult;
    type Filter = TicketFilter;

    fn id(&self) -> &String { &self.ticket_id }

    fn from_create_params(id: String, params: TicketCreate) -> Result<Self, String> {
        if params.use_limit == 0 {
            return Err("use limit must be positive".to_string());
        }
        if params.expires_at <= params.created_at {
            return Err("ticket must expire after it is created".to_string());
        }
        Ok(Self {
            ticket_id: id,
            order_id: params.order_id,
            storage_key: params.storage_key,
            expires_at: params.expires_at,
            use_limit: params.use_limit,
            use_count: 0,
            last_used_at: None,
            created_at: params.created_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("tickets change only through redemption".to_string())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("tickets are retained for audit".to_string())
    }

    /// # Actions
    /// - `Redeem { now }`: conditional increment of `use_count`, stamping `last_used_at`
    fn handle_action(&mut self, action: TicketAction) -> Result<TicketActionResult, String> {
        match action {
            TicketAction::Redeem { now } => {
                let redemption = match self.redeem(now) {
                    Ok(()) => Redemption::Redeemed(self.clone()),
                    Err(refusal) => Redemption::Refused(refusal),
                };
                Ok(TicketActionResult::Redeem(redemption))
            }
        }
    }

    fn matches(&self, filter: &TicketFilter) -> bool {
        filter.accepts(self)
    }

    fn supersedes(&self, other: &Self) -> bool {
        self.created_at > other.created_at
    }
}
