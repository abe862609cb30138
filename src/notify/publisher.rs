// Publisher capability - Hand the composed warning to a messaging backend

use crate::error::PublishError;
use crate::notify::PublishInput;
use async_trait::async_trait;
use tracing::{error, info};

/// Messaging backend that accepts one message and returns its acknowledgment id
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, input: &PublishInput) -> Result<String, PublishError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Send `input` through `publisher`, returning `"MessageID: <id>"`
pub async fn publish(publisher: &dyn Publisher, input: PublishInput) -> Result<String, PublishError> {
    match publisher.publish(&input).await {
        Ok(message_id) => {
            info!(
                "Published \"{}\" to {} via {}: {}",
                input.subject,
                input.destination,
                publisher.name(),
                message_id
            );
            Ok(format!("MessageID: {}", message_id))
        }
        Err(e) => {
            error!(
                "Failed to publish to {} via {}: {}",
                input.destination,
                publisher.name(),
                e
            );
            Err(e)
        }
    }
}

/// Logs the message instead of sending it
#[derive(Debug, Default)]
pub struct DryRunPublisher;

pub const DRY_RUN_MESSAGE_ID: &str = "dry-run";

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, input: &PublishInput) -> Result<String, PublishError> {
        info!(
            "[dry-run] to={} subject=\"{}\" message=\"{}\"",
            input.destination, input.subject, input.message
        );
        Ok(DRY_RUN_MESSAGE_ID.to_string())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
