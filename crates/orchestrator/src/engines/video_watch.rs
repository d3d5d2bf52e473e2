#![forbid(unsafe_code)]

use crate::domain::VideoCursor;
use crate::engine::Services;
use crate::engines::{fetch, pause};
use crate::hooks::{Hook, NewVideo, fire};
use config::{Config, Feature};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct VideoWatchEngine {
    config: Arc<Config>,
    services: Services,
    cursor: VideoCursor,
    on_new_video: Option<Hook<NewVideo>>,
}

impl VideoWatchEngine {
    pub fn new(config: Arc<Config>, services: Services) -> Self {
        Self {
            config,
            services,
            cursor: VideoCursor::new(),
            on_new_video: None,
        }
    }

    pub fn on_new_video(&mut self, hook: Hook<NewVideo>) {
        self.on_new_video = Some(hook);
    }

    pub fn cursor(&self) -> &VideoCursor {
        &self.cursor
    }

    pub async fn tick(&mut self) -> Option<NewVideo> {
        if self.config.system.maintenance {
            debug!("maintenance mode; skipping video check");
            return None;
        }
        if !self.config.features.is_enabled(Feature::VideoNotifications) {
            debug!("video notifications disabled");
            return None;
        }

        let snapshot = fetch(
            self.services.source.as_ref(),
            self.config.intervals.fetch_timeout,
        )
        .await?;
        let observed = snapshot.latest_video_id.as_deref();
        let baseline = self.cursor.last_seen().is_none();
        let previous = self.cursor.observe(observed);
        if baseline && let Some(id) = self.cursor.last_seen() {
            debug!(video = id, "video baseline recorded");
        }

        let previous_id = previous?;
        let event = NewVideo {
            video_id: self.cursor.last_seen()?.to_owned(),
            previous_id,
            at: self.services.clock.now(),
        };
        info!(video = %event.video_id, previous = %event.previous_id, "new video");
        fire(self.on_new_video.as_ref(), event.clone()).await;
        Some(event)
    }

    pub async fn run_until(mut self, cancel: CancellationToken) {
        info!(period = ?self.config.intervals.video_period(), "video watch started");
        while !cancel.is_cancelled() {
            self.tick().await;
            let period = self.config.intervals.video_period();
            if !pause(self.services.clock.as_ref(), period, &cancel).await {
                break;
            }
        }
        info!("video watch stopped");
    }
}
