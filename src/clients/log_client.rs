use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{DownloadLogCreate, DownloadLogEntry};
use crate::log_actor::LogError;

/// Client for appending to the download audit log.
#[derive(Clone)]
pub struct LogClient {
    inner: ResourceClient<DownloadLogEntry>,
}

impl_basic_client!(LogClient, DownloadLogEntry, LogError, download_log);

impl LogClient {
    #[instrument(skip(self, entry), fields(ticket_id = %entry.ticket_id, order_id = %entry.order_id))]
    pub async fn append(&self, entry: DownloadLogCreate) -> Result<DownloadLogEntry, LogError> {
        debug!("Sending request");
        self.inner.create(entry).await.map_err(LogError::from)
    }
}
