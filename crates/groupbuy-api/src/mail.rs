use tracing::info;

/// Outbound mail collaborator. Delivery failure is never surfaced to the
/// requester (it would confirm whether an address is registered); callers
/// log and move on.
pub trait Mailer: Send + Sync {
    fn send_reset_link(&self, email: &str, reset_url: &str) -> anyhow::Result<()>;
}

/// Development mailer: writes the reset link to the log instead of
/// delivering it.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_reset_link(&self, email: &str, reset_url: &str) -> anyhow::Result<()> {
        info!(%email, %reset_url, "password reset link issued");
        Ok(())
    }
}
