use serde::Serialize;
use std::fmt;

/// How strongly a grant is backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    /// A completed order owned by the requester, gated by a ticket.
    Verified,
    /// Only a settlement receipt for the transaction; no ticket, no audit row.
    Degraded,
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustTier::Verified => f.write_str("verified"),
            TrustTier::Degraded => f.write_str("degraded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadGrant {
    pub download_url: String,
    /// Seconds the download URL stays valid.
    pub expires_in: i64,
    pub remaining_downloads: u32,
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    pub trust: TrustTier,
}
