use async_trait::async_trait;

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver a message. Failures are reported as `false`, never raised.
    async fn send(&self, title: &str, body: &str) -> bool;
}
