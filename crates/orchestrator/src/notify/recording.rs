#![forbid(unsafe_code)]

use crate::notify::{MessageHandle, Notification, Notifier, NotifyError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent(Notification),
    Edited(MessageHandle, Notification),
}

/// Keeps every delivery in memory. Can be switched to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Every notification sent or edited, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.deliveries
            .lock()
            .iter()
            .map(|delivery| match delivery {
                Delivery::Sent(n) | Delivery::Edited(_, n) => n.clone(),
            })
            .collect()
    }

    fn check(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::DestinationUnset(notification.feature()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<MessageHandle, NotifyError> {
        self.check(notification)?;
        let mut deliveries = self.deliveries.lock();
        deliveries.push(Delivery::Sent(notification.clone()));
        Ok(MessageHandle {
            destination: "memory".to_owned(),
            id: deliveries.len().to_string(),
        })
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        self.check(notification)?;
        self.deliveries
            .lock()
            .push(Delivery::Edited(handle.clone(), notification.clone()));
        Ok(())
    }
}
