use crate::actor_framework::Entity;
use crate::domain::{DownloadLogCreate, DownloadLogEntry, LogFilter};

impl Entity for DownloadLogEntry {
    type Id = String;
    type CreateParams = DownloadLogCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Filter = LogFilter;

    fn id(&self) -> &String { &self.entry_id }

    fn from_create_params(id: String, params: DownloadLogCreate) -> Result<Self, String> {
        Ok(Self {
            entry_id: id,
            ticket_id: params.ticket_id,
            order_id: params.order_id,
            buyer_address: params.buyer_address,
            product_id: params.product_id,
            ip_address: params.ip_address,
            user_agent: params.user_agent,
            downloaded_at: params.downloaded_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("download log is append-only".to_string())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("download log is append-only".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }

    fn matches(&self, filter: &LogFilter) -> bool {
        filter.accepts(self)
    }
}
