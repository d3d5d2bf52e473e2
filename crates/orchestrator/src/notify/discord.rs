#![forbid(unsafe_code)]

use crate::notify::{MessageHandle, Notification, Notifier, NotifyError, Rendered};
use async_trait::async_trait;
use config::{Config, Destinations, Feature};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const EMBED_COLOR_LIVE: u32 = 0xFE2C55;
const EMBED_COLOR_INFO: u32 = 0x25F4EE;

/// Delivers notifications through Discord webhooks, one webhook URL per
/// feature taken from `[channels]`.
#[derive(Debug, Clone)]
pub struct DiscordWebhookNotifier {
    client: reqwest::Client,
    channels: Destinations,
    roles: Destinations,
}

impl DiscordWebhookNotifier {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            channels: config.channels.clone(),
            roles: config.roles.clone(),
        })
    }

    fn destination(&self, feature: Feature) -> Result<&str, NotifyError> {
        self.channels
            .get(feature)
            .ok_or(NotifyError::DestinationUnset(feature))
    }

    /// Webhook body: the rendered embed and an optional role mention.
    pub fn payload(&self, notification: &Notification) -> Value {
        let role = self.roles.get(notification.feature());
        let content = role.map(|id| format!("<@&{id}>"));
        json!({
            "content": content,
            "embeds": [embed(&notification.render(), color(notification))],
            "allowed_mentions": { "roles": role.into_iter().collect::<Vec<_>>() },
        })
    }
}

fn color(notification: &Notification) -> u32 {
    match notification {
        Notification::LiveStart(_) | Notification::LiveSummary(_) => EMBED_COLOR_LIVE,
        _ => EMBED_COLOR_INFO,
    }
}

fn embed(rendered: &Rendered, color: u32) -> Value {
    let fields: Vec<Value> = rendered
        .fields
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value, "inline": true }))
        .collect();
    json!({
        "title": rendered.title,
        "description": rendered.description,
        "url": rendered.url,
        "color": color,
        "fields": fields,
    })
}

#[async_trait]
impl Notifier for DiscordWebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<MessageHandle, NotifyError> {
        let destination = self.destination(notification.feature())?;
        let response = self
            .client
            .post(destination)
            .query(&[("wait", "true")])
            .json(&self.payload(notification))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NotifyError::Decode("message id missing".to_owned()))?;
        debug!(message_id = id, "webhook message created");
        Ok(MessageHandle {
            destination: destination.to_owned(),
            id: id.to_owned(),
        })
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let url = format!(
            "{}/messages/{}",
            handle.destination.trim_end_matches('/'),
            handle.id
        );
        let response = self
            .client
            .patch(url)
            .json(&self.payload(notification))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}
