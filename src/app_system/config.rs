use clap::Parser;
use std::net::SocketAddr;

use super::SystemError;
use crate::controller::DownloadPolicy;

#[derive(Parser, Debug)]
#[clap(name = "download_gate", about = "Ticketed download access for marketplace purchases")]
pub struct Cli {
    /// Address the HTTP server listens on
    #[clap(long, default_value = "0.0.0.0:8080", env = "DOWNLOAD_BIND_ADDRESS")]
    pub bind_address: SocketAddr,

    /// Externally reachable base URL, used when signing retrieval URLs
    #[clap(long, default_value = "http://localhost:8080", env = "DOWNLOAD_PUBLIC_BASE_URL")]
    pub public_base_url: String,

    /// Key for the HMAC over retrieval URLs
    #[clap(long, env = "DOWNLOAD_URL_SIGNING_SECRET", hide_env_values = true)]
    pub url_signing_secret: String,

    /// Key for the HMAC over settlement receipts
    #[clap(long, env = "DOWNLOAD_RECEIPT_SECRET", hide_env_values = true)]
    pub receipt_secret: String,

    /// Lifetime of a download ticket and of each signed URL, in seconds
    #[clap(long, default_value_t = 600, env = "DOWNLOAD_TICKET_TTL_SECS")]
    pub ticket_ttl_secs: u64,

    /// Downloads allowed per ticket
    #[clap(long, default_value_t = 3, env = "DOWNLOAD_TICKET_USE_LIMIT")]
    pub ticket_use_limit: u32,

    /// Remaining downloads reported on receipt-backed grants
    #[clap(long, default_value_t = 2, env = "DOWNLOAD_FALLBACK_REMAINING_USES")]
    pub fallback_remaining_uses: u32,

    /// How long a settlement receipt can open the degraded path, in seconds
    #[clap(long, default_value_t = 86_400, env = "DOWNLOAD_RECEIPT_TTL_SECS")]
    pub receipt_ttl_secs: u64,

    /// Bounded mailbox size of every resource actor
    #[clap(long, default_value_t = 32, env = "DOWNLOAD_MAILBOX_SIZE")]
    pub mailbox_size: usize,
}

fn seconds(name: &str, secs: u64) -> Result<chrono::Duration, SystemError> {
    if secs == 0 {
        return Err(SystemError::Config(format!("{name} must be positive")));
    }
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| SystemError::Config(format!("{name} {secs} is too large")))
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub bind_address: SocketAddr,
    pub public_base_url: String,
    pub url_signing_secret: String,
    pub receipt_secret: String,
    pub receipt_ttl: chrono::Duration,
    pub policy: DownloadPolicy,
    pub mailbox_size: usize,
}

impl TryFrom<Cli> for DownloadSettings {
    type Error = SystemError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.ticket_use_limit == 0 {
            return Err(SystemError::Config("ticket use limit must be positive".to_string()));
        }
        if cli.mailbox_size == 0 {
            return Err(SystemError::Config("mailbox size must be positive".to_string()));
        }
        let ticket_ttl = seconds("ticket ttl", cli.ticket_ttl_secs)?;
        let receipt_ttl = seconds("receipt ttl", cli.receipt_ttl_secs)?;

        Ok(Self {
            bind_address: cli.bind_address,
            public_base_url: cli.public_base_url,
            url_signing_secret: cli.url_signing_secret,
            receipt_secret: cli.receipt_secret,
            receipt_ttl,
            policy: DownloadPolicy {
                ticket_ttl,
                use_limit: cli.ticket_use_limit,
                fallback_remaining_uses: cli.fallback_remaining_uses,
            },
            mailbox_size: cli.mailbox_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_ticket_policy() {
        let cli = Cli::try_parse_from([
            "download_gate",
            "--url-signing-secret",
            "url-key",
            "--receipt-secret",
            "receipt-key",
        ])
        .unwrap();
        let settings = DownloadSettings::try_from(cli).unwrap();
        assert_eq!(settings.policy, DownloadPolicy::default());
        assert_eq!(settings.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.mailbox_size, 32);
        assert_eq!(settings.receipt_ttl, chrono::Duration::hours(24));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let cli = Cli::try_parse_from([
            "download_gate",
            "--url-signing-secret",
            "a",
            "--receipt-secret",
            "b",
            "--ticket-use-limit",
            "0",
        ])
        .unwrap();
        assert!(matches!(DownloadSettings::try_from(cli), Err(SystemError::Config(_))));

        let cli = Cli::try_parse_from([
            "download_gate",
            "--url-signing-secret",
            "a",
            "--receipt-secret",
            "b",
            "--receipt-ttl-secs",
            "0",
        ])
        .unwrap();
        assert!(matches!(DownloadSettings::try_from(cli), Err(SystemError::Config(_))));
    }
}
