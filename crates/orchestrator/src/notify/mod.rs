#![forbid(unsafe_code)]

mod discord;
mod log;
mod notification;
mod recording;

pub use discord::DiscordWebhookNotifier;
pub use log::LogNotifier;
pub use notification::{
    DailyReport, LiveStart, Notification, Rendered, SessionFigures, VideoUpload, format_duration,
    video_url,
};
pub use recording::{Delivery, RecordingNotifier};

use async_trait::async_trait;
use config::{Feature, Features};
use tracing::{debug, info, warn};

/// Reference to a delivered message, used for in-place edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub destination: String,
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no destination configured for {0}")]
    DestinationUnset(Feature),

    #[error("delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("destination answered {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Chat-platform collaborator. Reports success or failure only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<MessageHandle, NotifyError>;

    async fn edit(
        &self,
        handle: &MessageHandle,
        notification: &Notification,
    ) -> Result<(), NotifyError>;
}

/// Send `notification` if its feature is enabled. Failures are logged and
/// not retried.
pub async fn publish(
    notifier: &dyn Notifier,
    features: &Features,
    notification: &Notification,
) -> Option<MessageHandle> {
    let feature = notification.feature();
    if !features.is_enabled(feature) {
        debug!(%feature, "feature disabled; not publishing");
        return None;
    }
    match notifier.send(notification).await {
        Ok(handle) => {
            info!(%feature, message_id = %handle.id, "notification sent");
            Some(handle)
        }
        Err(err) => {
            warn!(%feature, %err, "notification not delivered");
            None
        }
    }
}
