#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::domain::SessionState;
use crate::engines::{
    DailyAggregationEngine, FinalSummaryEngine, LiveSessionEngine, LiveSummaryEngine,
    PollingEngine, VideoWatchEngine,
};
use crate::hooks::{LiveEnded, LiveStarted, NewVideo};
use crate::notify::{LiveStart, Notification, Notifier, VideoUpload, publish};
use crate::persistence::{DailyLogStore, SessionLog};
use chrono::{DateTime, Utc};
use config::Config;
use oracle::ProfileSource;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

/// Collaborators shared by every engine.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn ProfileSource>,
    pub notifier: Arc<dyn Notifier>,
    pub daily_log: Arc<dyn DailyLogStore>,
    pub session_log: Arc<dyn SessionLog>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Log uptime, session and configuration state.
    DumpStatus,
}

struct ActiveSession {
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
    live_summary: watch::Receiver<SessionState>,
}

/// Wires the engines together. It is the only component that knows about
/// more than one engine.
pub struct Orchestrator {
    config: Arc<Config>,
    services: Services,
    final_summary: FinalSummaryEngine,
    session: Option<ActiveSession>,
    sessions_started: u64,
    sessions_finished: u64,
    videos_seen: u64,
}

impl Orchestrator {
    pub fn new(config: Config, services: Services) -> Self {
        let config = Arc::new(config);
        Self {
            final_summary: FinalSummaryEngine::new(config.clone(), services.clone()),
            config,
            services,
            session: None,
            sessions_started: 0,
            sessions_finished: 0,
            videos_seen: 0,
        }
    }

    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    pub fn sessions_finished(&self) -> u64 {
        self.sessions_finished
    }

    /// Run every engine until `cancel` fires, then wait for each of them to
    /// finish its current iteration.
    pub async fn run_until(
        &mut self,
        cancel: CancellationToken,
        mut control_rx: mpsc::UnboundedReceiver<ControlEvent>,
    ) {
        let launched_at = self.services.clock.now();
        let (start_tx, start_rx) = flume::unbounded::<LiveStarted>();
        let (end_tx, end_rx) = flume::unbounded::<LiveEnded>();
        let (video_tx, video_rx) = flume::unbounded::<NewVideo>();
        let mut tasks = JoinSet::new();

        let mut polling = PollingEngine::new(self.config.clone(), self.services.clone());
        polling.on_live_start(start_tx);
        spawn(&mut tasks, "polling", info_span!("polling"), polling.run_until(cancel.child_token()));

        let mut video = VideoWatchEngine::new(self.config.clone(), self.services.clone());
        video.on_new_video(video_tx);
        spawn(&mut tasks, "video_watch", info_span!("video_watch"), video.run_until(cancel.child_token()));

        let daily = DailyAggregationEngine::new(self.config.clone(), self.services.clone());
        spawn(&mut tasks, "daily", info_span!("daily"), daily.run_until(cancel.child_token()));

        info!(username = %self.config.username, "monitoring started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                Some(event) = control_rx.recv() => {
                    self.handle_control(event, launched_at);
                }
                Ok(started) = start_rx.recv_async() => {
                    self.handle_live_started(started, &mut tasks, &cancel, &end_tx).await;
                }
                Ok(ended) = end_rx.recv_async() => {
                    self.handle_live_ended(ended).await;
                }
                Ok(video) = video_rx.recv_async() => {
                    self.handle_new_video(video).await;
                }
                Some(joined) = tasks.join_next() => {
                    watchdog(joined, &cancel);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            watchdog(joined, &cancel);
        }
        // An end edge that raced the shutdown still gets its final summary.
        while let Ok(ended) = end_rx.try_recv() {
            self.handle_live_ended(ended).await;
        }
        if let Some(session) = self.session.take() {
            info!(started_at = %session.started_at, "session still open at shutdown");
        }
        info!("monitoring stopped");
    }

    async fn handle_live_started(
        &mut self,
        started: LiveStarted,
        tasks: &mut JoinSet<&'static str>,
        cancel: &CancellationToken,
        end_tx: &flume::Sender<LiveEnded>,
    ) {
        if let Some(session) = &self.session {
            debug!(since = %session.started_at, "session already active; start ignored");
            return;
        }

        publish(
            self.services.notifier.as_ref(),
            &self.config.features,
            &Notification::LiveStart(LiveStart {
                username: self.config.username.clone(),
                title: started.snapshot.live_title.clone(),
                viewers: started.snapshot.viewer_count,
                started_at: started.at,
            }),
        )
        .await;

        let session_cancel = cancel.child_token();
        let mut tracker = LiveSessionEngine::new(self.config.clone(), self.services.clone(), &started);
        tracker.on_live_end(end_tx.clone());
        let summary =
            LiveSummaryEngine::new(self.config.clone(), self.services.clone(), tracker.subscribe());

        let live_summary = summary.subscribe();
        let span = info_span!("session", started_at = %started.at);
        spawn(
            tasks,
            "live_session",
            info_span!(parent: &span, "live_session"),
            tracker.run_until(session_cancel.clone()),
        );
        spawn(
            tasks,
            "live_summary",
            info_span!(parent: &span, "live_summary"),
            summary.run_until(session_cancel.clone()),
        );

        self.sessions_started += 1;
        self.session = Some(ActiveSession {
            cancel: session_cancel,
            started_at: started.at,
            live_summary,
        });
    }

    async fn handle_live_ended(&mut self, ended: LiveEnded) {
        let live_summary = match self.session.take() {
            Some(session) => {
                session.cancel.cancel();
                let copy = session.live_summary.borrow().clone();
                Some(copy)
            }
            None => {
                warn!("end edge without an active session");
                None
            }
        };
        self.final_summary
            .publish(&ended, live_summary.as_ref())
            .instrument(info_span!("final_summary"))
            .await;
        self.sessions_finished += 1;
    }

    async fn handle_new_video(&mut self, video: NewVideo) {
        self.videos_seen += 1;
        publish(
            self.services.notifier.as_ref(),
            &self.config.features,
            &Notification::NewVideo(VideoUpload {
                username: self.config.username.clone(),
                video_id: video.video_id,
            }),
        )
        .await;
    }

    fn handle_control(&self, event: ControlEvent, launched_at: DateTime<Utc>) {
        match event {
            ControlEvent::DumpStatus => {
                let now = self.services.clock.now();
                info!(
                    username = %self.config.username,
                    uptime_secs = (now - launched_at).num_seconds(),
                    session_active = self.session.is_some(),
                    session_started_at = ?self.session.as_ref().map(|s| s.started_at),
                    sessions_started = self.sessions_started,
                    sessions_finished = self.sessions_finished,
                    videos_seen = self.videos_seen,
                    maintenance = self.config.system.maintenance,
                    features = ?self.config.features,
                    intervals = ?self.config.intervals,
                    "status"
                );
            }
        }
    }
}

fn spawn<F>(tasks: &mut JoinSet<&'static str>, name: &'static str, span: Span, future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tasks.spawn(
        async move {
            future.await;
            name
        }
        .instrument(span),
    );
}

fn watchdog(joined: Result<&'static str, tokio::task::JoinError>, cancel: &CancellationToken) {
    match joined {
        Ok(name @ ("live_session" | "live_summary")) => debug!(engine = name, "session engine finished"),
        Ok(name) if cancel.is_cancelled() => debug!(engine = name, "engine finished"),
        Ok(name) => warn!(engine = name, "engine exited unexpectedly"),
        Err(err) => error!(%err, "engine task failed"),
    }
}
