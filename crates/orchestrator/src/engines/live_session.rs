#![forbid(unsafe_code)]

use crate::domain::{Edge, EdgeState, SessionState};
use crate::engine::Services;
use crate::engines::{fetch, pause};
use crate::hooks::{Hook, LiveEnded, LiveStarted, fire};
use config::Config;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Follows one live session at the fast cadence until a positive not-live
/// observation ends it. One-shot: `run_until` returns after the end edge.
pub struct LiveSessionEngine {
    config: Arc<Config>,
    services: Services,
    edge: EdgeState,
    session: SessionState,
    updates: watch::Sender<SessionState>,
    on_live_end: Option<Hook<LiveEnded>>,
}

impl LiveSessionEngine {
    pub fn new(config: Arc<Config>, services: Services, started: &LiveStarted) -> Self {
        let session = SessionState::start(started.at, &started.snapshot);
        let (updates, _) = watch::channel(session.clone());
        Self {
            config,
            services,
            edge: EdgeState::live(),
            session,
            updates,
            on_live_end: None,
        }
    }

    pub fn on_live_end(&mut self, hook: Hook<LiveEnded>) {
        self.on_live_end = Some(hook);
    }

    /// Read-only feed of the session figures after every observation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// One poll. Returns the end event once the session is over.
    pub async fn tick(&mut self) -> Option<LiveEnded> {
        if self.config.system.maintenance {
            debug!("maintenance mode; skipping session poll");
            return None;
        }

        let snapshot = fetch(
            self.services.source.as_ref(),
            self.config.intervals.fetch_timeout,
        )
        .await?;
        let now = self.services.clock.now();

        match self.edge.observe(snapshot.live) {
            Some(Edge::Ended) => {
                info!(
                    peak = self.session.peak_viewer_count,
                    duration_secs = self.session.duration(now).num_seconds(),
                    "live ended"
                );
                Some(LiveEnded {
                    session: self.session.clone(),
                    at: now,
                })
            }
            _ => {
                self.session.observe(now, &snapshot);
                self.updates.send_replace(self.session.clone());
                None
            }
        }
    }

    pub async fn run_until(mut self, cancel: CancellationToken) {
        info!(period = ?self.config.intervals.live_check, "session tracking started");
        while !cancel.is_cancelled() {
            if let Some(ended) = self.tick().await {
                fire(self.on_live_end.as_ref(), ended).await;
                return;
            }
            let period = self.config.intervals.live_check;
            if !pause(self.services.clock.as_ref(), period, &cancel).await {
                break;
            }
        }
        info!("session tracking cancelled");
    }
}
