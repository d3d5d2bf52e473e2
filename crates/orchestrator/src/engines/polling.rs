#![forbid(unsafe_code)]

use crate::domain::{Edge, EdgeState};
use crate::engine::Services;
use crate::engines::{fetch, pause};
use crate::hooks::{Hook, LiveStarted, fire};
use config::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Detects the offline to live edge at the coarse offline cadence.
pub struct PollingEngine {
    config: Arc<Config>,
    services: Services,
    edge: EdgeState,
    on_live_start: Option<Hook<LiveStarted>>,
}

impl PollingEngine {
    pub fn new(config: Arc<Config>, services: Services) -> Self {
        Self {
            config,
            services,
            edge: EdgeState::offline(),
            on_live_start: None,
        }
    }

    pub fn on_live_start(&mut self, hook: Hook<LiveStarted>) {
        self.on_live_start = Some(hook);
    }

    pub fn edge(&self) -> EdgeState {
        self.edge
    }

    /// One poll. Returns the start event when this poll completed the edge.
    pub async fn tick(&mut self) -> Option<LiveStarted> {
        if self.config.system.maintenance {
            debug!("maintenance mode; skipping poll");
            return None;
        }

        let snapshot = fetch(
            self.services.source.as_ref(),
            self.config.intervals.fetch_timeout,
        )
        .await?;
        debug!(live = ?snapshot.live, was_live = self.edge.was_live(), "polled");

        match self.edge.observe(snapshot.live) {
            Some(Edge::Started) => {
                let event = LiveStarted {
                    snapshot,
                    at: self.services.clock.now(),
                };
                info!(viewers = ?event.snapshot.viewer_count, "went live");
                fire(self.on_live_start.as_ref(), event.clone()).await;
                Some(event)
            }
            Some(Edge::Ended) => {
                debug!("observed offline; session end is left to the session loop");
                None
            }
            None => None,
        }
    }

    pub async fn run_until(mut self, cancel: CancellationToken) {
        info!(period = ?self.config.intervals.offline_period(), "polling started");
        while !cancel.is_cancelled() {
            self.tick().await;
            let period = self.config.intervals.offline_period();
            if !pause(self.services.clock.as_ref(), period, &cancel).await {
                break;
            }
        }
        info!("polling stopped");
    }
}
