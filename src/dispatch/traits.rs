// Dispatcher trait — the swap-ready seam in front of the email provider.

use anyhow::Result;
use async_trait::async_trait;

/// Sends one message to one recipient.
///
/// Implementations must be async because every provider is an HTTP API.
/// An `Err` means the message was not accepted; callers treat it as a
/// failed send and never propagate it further.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Attempt to send `subject`/`body` to `recipient`, labelled with `tag`.
    async fn send(&self, recipient: &str, subject: &str, body: &str, tag: &str) -> Result<()>;
}
