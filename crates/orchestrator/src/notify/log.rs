#![forbid(unsafe_code)]

use crate::notify::{MessageHandle, Notification, Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_id: AtomicU64,
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<MessageHandle, NotifyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let rendered = notification.render();
        info!(
            feature = %notification.feature(),
            message_id = %id,
            title = %rendered.title,
            fields = ?rendered.fields,
            "{}",
            rendered.description
        );
        Ok(MessageHandle {
            destination: "log".to_owned(),
            id,
        })
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let rendered = notification.render();
        info!(
            feature = %notification.feature(),
            message_id = %handle.id,
            title = %rendered.title,
            fields = ?rendered.fields,
            "edited"
        );
        Ok(())
    }
}
