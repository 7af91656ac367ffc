use crate::domain::ports::notifier::Notifier;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Posts `{"title": ..., "content": ...}` as JSON to a fixed URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    content: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, title: &str, body: &str) -> bool {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                title,
                content: body,
            })
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %text, "webhook rejected notification");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "webhook request failed");
                false
            }
        }
    }
}
