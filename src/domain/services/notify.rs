use std::sync::Arc;
use crate::domain::{models::notification::NotificationKind, ports::NotificationSender};
use tracing::warn;

/// Fire-and-forget dispatch to the platform notification service. Failures
/// are logged and swallowed; scheduling operations never fail because a
/// notification could not be delivered.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn NotificationSender>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }

    pub fn dispatch(&self, user_id: &str, kind: NotificationKind, context: serde_json::Value) {
        let sender = self.sender.clone();
        let user_id = user_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = sender.notify(&user_id, kind, &context).await {
                warn!("Failed to send {} notification to user {}: {}", kind.as_str(), user_id, e);
            }
        });
    }
}
