#![forbid(unsafe_code)]

use crate::domain::SessionState;
use crate::engine::Services;
use crate::engines::{fetch, pause};
use crate::notify::{MessageHandle, Notification, SessionFigures, publish};
use config::{Config, Feature};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Keeps one summary message up to date while a session runs.
///
/// Holds its own copy of the session, folded from its own fetches and merged
/// with the session loop's published copy before every refresh. The copy is
/// republished so the final summary never reports less than this message.
pub struct LiveSummaryEngine {
    config: Arc<Config>,
    services: Services,
    session: SessionState,
    updates: watch::Receiver<SessionState>,
    published: watch::Sender<SessionState>,
    message: Option<MessageHandle>,
}

impl LiveSummaryEngine {
    pub fn new(config: Arc<Config>, services: Services, updates: watch::Receiver<SessionState>) -> Self {
        let session = updates.borrow().clone();
        let (published, _) = watch::channel(session.clone());
        Self {
            config,
            services,
            session,
            updates,
            published,
            message: None,
        }
    }

    /// Read-only feed of this engine's copy after every refresh.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.published.subscribe()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The message being edited, once the first refresh was delivered.
    pub fn message(&self) -> Option<&MessageHandle> {
        self.message.as_ref()
    }

    /// One refresh. Returns the figures that were rendered, if any.
    pub async fn tick(&mut self) -> Option<SessionFigures> {
        if self.config.system.maintenance {
            debug!("maintenance mode; skipping summary refresh");
            return None;
        }

        let latest = self.updates.borrow_and_update().clone();
        self.session.merge(&latest);

        if !self.config.features.is_enabled(Feature::LiveSummary) {
            debug!("live summary disabled");
            return None;
        }

        if let Some(snapshot) = fetch(
            self.services.source.as_ref(),
            self.config.intervals.fetch_timeout,
        )
        .await
        {
            self.session.observe(self.services.clock.now(), &snapshot);
        }
        self.published.send_replace(self.session.clone());

        let figures = SessionFigures::from_session(
            &self.config.username,
            &self.session,
            self.services.clock.now(),
        );
        let notification = Notification::LiveSummary(figures.clone());
        match &self.message {
            Some(handle) => {
                if let Err(err) = self.services.notifier.edit(handle, &notification).await {
                    warn!(%err, message_id = %handle.id, "live summary not updated");
                }
            }
            None => {
                self.message = publish(
                    self.services.notifier.as_ref(),
                    &self.config.features,
                    &notification,
                )
                .await;
            }
        }
        Some(figures)
    }

    /// Refreshes after every interval until cancelled. The first refresh
    /// happens one interval after the session started.
    pub async fn run_until(mut self, cancel: CancellationToken) {
        let period = self.config.intervals.live_summary_period();
        info!(?period, "live summary started");
        while pause(self.services.clock.as_ref(), period, &cancel).await {
            if cancel.is_cancelled() {
                break;
            }
            self.tick().await;
        }
        info!(peak = self.session.peak_viewer_count, "live summary stopped");
    }
}
