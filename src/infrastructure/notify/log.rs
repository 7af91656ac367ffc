use crate::domain::ports::notifier::Notifier;

/// Writes alerts to the log. Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, title: &str, body: &str) -> bool {
        tracing::info!(%title, %body, "alert notification");
        true
    }
}
