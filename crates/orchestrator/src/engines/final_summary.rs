#![forbid(unsafe_code)]

use crate::domain::SessionState;
use crate::engine::Services;
use crate::hooks::LiveEnded;
use crate::notify::{Notification, SessionFigures, publish};
use crate::persistence::SessionRecord;
use config::Config;
use std::sync::Arc;
use tracing::{info, warn};

/// One-shot publisher of a finished session. Keeps no deduplication state;
/// the caller invokes it once per confirmed end edge.
pub struct FinalSummaryEngine {
    config: Arc<Config>,
    services: Services,
}

impl FinalSummaryEngine {
    pub fn new(config: Arc<Config>, services: Services) -> Self {
        Self { config, services }
    }

    /// Publish the session of `ended`, folded with the live summary's copy
    /// when one is available. Duration runs to the end edge.
    pub async fn publish(&self, ended: &LiveEnded, live_summary: Option<&SessionState>) -> SessionFigures {
        let mut session = ended.session.clone();
        if let Some(copy) = live_summary {
            session.merge(copy);
        }
        let figures = SessionFigures::from_session(&self.config.username, &session, ended.at);
        info!(
            duration_secs = figures.duration.num_seconds(),
            peak = figures.peak_viewers,
            likes = figures.total_likes,
            gifts = figures.total_gifts,
            "session finished"
        );

        publish(
            self.services.notifier.as_ref(),
            &self.config.features,
            &Notification::FinalSummary(figures.clone()),
        )
        .await;

        let record = SessionRecord {
            username: figures.username.clone(),
            started_at: figures.started_at,
            ended_at: ended.at,
            duration_secs: figures.duration.num_seconds(),
            peak_viewers: figures.peak_viewers,
            total_likes: figures.total_likes,
            total_gifts: figures.total_gifts,
            title: figures.title.clone(),
        };
        if let Err(err) = self.services.session_log.append(&record).await {
            warn!(%err, "session record not written");
        }
        figures
    }
}
