// HTTP topic publisher - POST the warning as JSON to the notification channel URL

use crate::error::PublishError;
use crate::notify::{PublishInput, Publisher};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// Response fields checked, in order, for the acknowledgment id
const MESSAGE_ID_FIELDS: &[&str] = &["id", "message_id", "MessageId"];

pub const DEFAULT_PUBLISH_TIMEOUT: Duration =
    Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS);

/// Publishes to a topic addressed by URL (ntfy, webhook relays, pub/sub HTTP bridges).
///
/// The destination receives `{"source", "destination", "subject", "message"}` and is
/// expected to answer 2xx with a JSON body carrying the message id.
pub struct HttpTopicPublisher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTopicPublisher {
    pub fn new(request_timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("certwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout: request_timeout,
        })
    }

    fn format_payload(&self, input: &PublishInput) -> Value {
        json!({
            "source": "certwatch",
            "destination": input.destination,
            "subject": input.subject,
            "message": input.message,
        })
    }
}

fn extract_message_id(body: &Value) -> Option<String> {
    MESSAGE_ID_FIELDS
        .iter()
        .filter_map(|field| body.get(field))
        .find_map(|value| match value {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
}

#[async_trait]
impl Publisher for HttpTopicPublisher {
    async fn publish(&self, input: &PublishInput) -> Result<String, PublishError> {
        let payload = self.format_payload(input);

        let response = self
            .client
            .post(&input.destination)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    PublishError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PublishError::MalformedResponse {
                details: e.to_string(),
            })?;

        extract_message_id(&body).ok_or_else(|| PublishError::MalformedResponse {
            details: format!("no message id in response: {}", body),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
