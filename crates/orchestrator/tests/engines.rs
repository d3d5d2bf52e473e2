#![forbid(unsafe_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use config::Config;
use oracle::{ProfileSnapshot, ScriptedSource};
use orchestrator::domain::SessionState;
use orchestrator::engines::{
    DailyAggregationEngine, FinalSummaryEngine, LiveSessionEngine, LiveSummaryEngine,
    PollingEngine, VideoWatchEngine,
};
use orchestrator::hooks::{LiveEnded, LiveStarted};
use orchestrator::notify::{Delivery, Notification, RecordingNotifier};
use orchestrator::persistence::{
    DailyLogStore, MemoryDailyLog, NoopSessionLog, SessionLog, SessionRecord, SnapshotRecord,
};
use orchestrator::{Error, ManualClock, Services};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingSessionLog {
    records: Mutex<Vec<SessionRecord>>,
}

#[async_trait]
impl SessionLog for RecordingSessionLog {
    async fn append(&self, record: &SessionRecord) -> Result<(), Error> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

struct Harness {
    source: Arc<ScriptedSource>,
    notifier: Arc<RecordingNotifier>,
    daily_log: Arc<MemoryDailyLog>,
    session_log: Arc<RecordingSessionLog>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new(script: Vec<Option<ProfileSnapshot>>, start: DateTime<Utc>) -> Self {
        Self {
            source: Arc::new(ScriptedSource::new(script)),
            notifier: Arc::new(RecordingNotifier::new()),
            daily_log: Arc::new(MemoryDailyLog::default()),
            session_log: Arc::new(RecordingSessionLog::default()),
            clock: Arc::new(ManualClock::new(start)),
        }
    }

    fn services(&self) -> Services {
        Services {
            source: self.source.clone(),
            notifier: self.notifier.clone(),
            daily_log: self.daily_log.clone(),
            session_log: self.session_log.clone(),
            clock: self.clock.clone(),
        }
    }
}

fn config() -> Arc<Config> {
    Arc::new(Config {
        username: "creator".to_owned(),
        ..Config::default()
    })
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn live(viewers: u64) -> Option<ProfileSnapshot> {
    Some(ProfileSnapshot {
        live: Some(true),
        viewer_count: Some(viewers),
        ..Default::default()
    })
}

fn offline() -> Option<ProfileSnapshot> {
    Some(ProfileSnapshot {
        live: Some(false),
        ..Default::default()
    })
}

fn video(id: &str) -> Option<ProfileSnapshot> {
    Some(ProfileSnapshot {
        latest_video_id: Some(id.to_owned()),
        ..Default::default()
    })
}

fn counters(followers: u64, likes: u64, views: u64) -> Option<ProfileSnapshot> {
    Some(ProfileSnapshot {
        live: Some(false),
        followers: Some(followers),
        likes: Some(likes),
        views: Some(views),
        ..Default::default()
    })
}

#[tokio::test]
async fn polling_fires_once_per_edge() {
    let harness = Harness::new(
        vec![offline(), live(5), None, live(7), offline(), live(9)],
        noon(),
    );
    let mut engine = PollingEngine::new(config(), harness.services());
    let (tx, rx) = flume::unbounded();
    engine.on_live_start(tx);

    let mut starts = Vec::new();
    for _ in 0..6 {
        if let Some(event) = engine.tick().await {
            starts.push(event.snapshot.viewer_count);
        }
    }

    assert_eq!(starts, vec![Some(5), Some(9)]);
    assert_eq!(rx.drain().count(), 2);
    assert!(engine.edge().was_live());
}

#[tokio::test]
async fn maintenance_mode_skips_fetching() {
    let harness = Harness::new(vec![live(5)], noon());
    let mut config = Config::default();
    config.system.maintenance = true;
    let mut engine = PollingEngine::new(Arc::new(config), harness.services());

    assert!(engine.tick().await.is_none());
    assert_eq!(harness.source.fetches(), 0);
}

#[tokio::test]
async fn live_session_ends_only_on_positive_offline() {
    let harness = Harness::new(vec![live(40), None, live(25), offline()], noon());
    let started = LiveStarted {
        snapshot: ProfileSnapshot {
            live: Some(true),
            viewer_count: Some(10),
            ..Default::default()
        },
        at: noon(),
    };
    let mut engine = LiveSessionEngine::new(config(), harness.services(), &started);
    let updates = engine.subscribe();

    assert!(engine.tick().await.is_none());
    assert_eq!(updates.borrow().peak_viewer_count, 40);
    assert!(engine.tick().await.is_none());
    assert!(engine.tick().await.is_none());
    assert_eq!(updates.borrow().last_viewer_count, 25);

    harness.clock.advance(Duration::from_secs(60));
    let ended = engine.tick().await.expect("offline observation ends the session");
    assert_eq!(ended.session.peak_viewer_count, 40);
    assert_eq!(ended.session.last_viewer_count, 25);
    assert_eq!(ended.at, noon() + TimeDelta::seconds(60));
}

#[tokio::test]
async fn live_session_run_fires_end_hook_and_returns() {
    let harness = Harness::new(vec![live(12), offline()], noon());
    let started = LiveStarted {
        snapshot: live(3).unwrap(),
        at: noon(),
    };
    let mut engine = LiveSessionEngine::new(config(), harness.services(), &started);
    let (tx, rx) = flume::unbounded();
    engine.on_live_end(tx);

    engine.run_until(CancellationToken::new()).await;

    let ended = rx.try_recv().expect("end hook fired");
    assert_eq!(ended.session.peak_viewer_count, 12);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn live_summary_sends_once_then_edits() {
    let harness = Harness::new(vec![live(30), live(20)], noon());
    let session = SessionState::start(noon(), &live(10).unwrap());
    let (updates_tx, updates_rx) = tokio::sync::watch::channel(session.clone());
    let mut engine = LiveSummaryEngine::new(config(), harness.services(), updates_rx);

    harness.clock.advance(Duration::from_secs(600));
    let first = engine.tick().await.expect("summary rendered");
    assert_eq!(first.peak_viewers, 30);

    let mut newer = session;
    newer.observe(noon() + TimeDelta::seconds(700), &live(55).unwrap());
    updates_tx.send_replace(newer);

    harness.clock.advance(Duration::from_secs(600));
    let second = engine.tick().await.expect("summary rendered");
    assert_eq!(second.peak_viewers, 55);
    assert_eq!(second.viewers, 20);
    assert_eq!(second.duration, TimeDelta::seconds(1200));

    let deliveries = harness.notifier.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert!(matches!(&deliveries[0], Delivery::Sent(Notification::LiveSummary(_))));
    match &deliveries[1] {
        Delivery::Edited(handle, Notification::LiveSummary(_)) => {
            assert_eq!(Some(handle), engine.message());
        }
        other => panic!("expected an edit, got {other:?}"),
    }
}

#[tokio::test]
async fn final_summary_reports_wall_clock_duration() {
    let harness = Harness::new(Vec::new(), noon());
    let mut session = SessionState::start(noon(), &live(10).unwrap());
    for (offset, viewers) in [(60, 80), (300, 120), (900, 40)] {
        session.observe(noon() + TimeDelta::seconds(offset), &live(viewers).unwrap());
    }
    let ended = LiveEnded {
        session,
        at: noon() + TimeDelta::seconds(930),
    };

    let engine = FinalSummaryEngine::new(config(), harness.services());
    let figures = engine.publish(&ended, None).await;

    assert_eq!(figures.duration, TimeDelta::seconds(930));
    assert_eq!(figures.peak_viewers, 120);
    assert_eq!(
        harness.notifier.notifications(),
        vec![Notification::FinalSummary(figures.clone())]
    );
    let records = harness.session_log.records.lock().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].duration_secs, 930);
    assert_eq!(records[0].peak_viewers, 120);
}

#[tokio::test]
async fn final_summary_folds_in_the_live_summary_copy() {
    let harness = Harness::new(vec![live(300)], noon());
    let mut session = SessionState::start(noon(), &live(10).unwrap());
    session.observe(noon() + TimeDelta::seconds(60), &live(120).unwrap());
    let (_updates_tx, updates_rx) = tokio::sync::watch::channel(session.clone());

    let mut summary = LiveSummaryEngine::new(config(), harness.services(), updates_rx);
    let published = summary.subscribe();
    harness.clock.advance(Duration::from_secs(600));
    summary.tick().await.expect("summary rendered");
    assert_eq!(published.borrow().peak_viewer_count, 300);

    let ended = LiveEnded {
        session,
        at: noon() + TimeDelta::seconds(930),
    };
    let copy = published.borrow().clone();
    let figures = FinalSummaryEngine::new(config(), harness.services())
        .publish(&ended, Some(&copy))
        .await;

    assert_eq!(figures.peak_viewers, 300);
    assert_eq!(figures.duration, TimeDelta::seconds(930));
    let records = harness.session_log.records.lock().clone();
    assert_eq!(records[0].peak_viewers, 300);
}

#[tokio::test]
async fn live_summary_stops_editing_once_cancelled() {
    let harness = Harness::new(vec![live(30), live(40), live(50)], noon());
    let session = SessionState::start(noon(), &live(10).unwrap());
    let (_updates_tx, updates_rx) = tokio::sync::watch::channel(session);
    let engine = LiveSummaryEngine::new(config(), harness.services(), updates_rx);

    let cancel = CancellationToken::new();
    let run = tokio::spawn(engine.run_until(cancel.clone()));
    while harness.notifier.deliveries().len() < 2 {
        tokio::task::yield_now().await;
    }
    cancel.cancel();
    let delivered = harness.notifier.deliveries().len();
    let fetched = harness.source.fetches();

    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("loop exits after cancel")
        .unwrap();
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }

    let deliveries = harness.notifier.deliveries();
    assert_eq!(deliveries.len(), delivered);
    assert_eq!(harness.source.fetches(), fetched);
    assert!(matches!(&deliveries[0], Delivery::Sent(_)));
    assert!(deliveries[1..].iter().all(|d| matches!(d, Delivery::Edited(..))));
}

#[tokio::test]
async fn final_summary_is_recorded_even_when_delivery_fails() {
    let harness = Harness::new(Vec::new(), noon());
    harness.notifier.set_failing(true);
    let ended = LiveEnded {
        session: SessionState::start(noon(), &live(10).unwrap()),
        at: noon() + TimeDelta::seconds(5),
    };

    FinalSummaryEngine::new(config(), harness.services())
        .publish(&ended, None)
        .await;

    assert!(harness.notifier.deliveries().is_empty());
    assert_eq!(harness.session_log.records.lock().len(), 1);
}

#[tokio::test]
async fn video_watch_baseline_is_silent() {
    let harness = Harness::new(
        vec![video("100"), video("100"), None, Some(ProfileSnapshot::default()), video("101")],
        noon(),
    );
    let mut engine = VideoWatchEngine::new(config(), harness.services());

    let mut events = Vec::new();
    for _ in 0..5 {
        events.push(engine.tick().await);
    }

    assert!(events[..4].iter().all(Option::is_none));
    let event = events[4].as_ref().expect("change fires");
    assert_eq!(event.video_id, "101");
    assert_eq!(event.previous_id, "100");
    assert_eq!(engine.cursor().last_seen(), Some("101"));
}

#[tokio::test]
async fn daily_reduce_emits_deltas() {
    let harness = Harness::new(vec![counters(100, 50, 10), counters(120, 70, 15)], noon());
    let mut engine = DailyAggregationEngine::new(config(), harness.services());

    assert!(engine.capture().await);
    harness.clock.advance(Duration::from_secs(3600));
    assert!(engine.capture().await);

    let delta = engine.reduce().await.expect("two snapshots reduce");
    assert_eq!(delta.followers_gained, 20);
    assert_eq!(delta.likes_gained, 20);
    assert_eq!(delta.views_gained, 5);
    assert_eq!(delta.followers, 120);

    match harness.notifier.notifications().as_slice() {
        [Notification::DailySummary(report)] => {
            assert_eq!(report.followers_gained, 20);
            assert_eq!(report.followers, 120);
        }
        other => panic!("unexpected notifications {other:?}"),
    }

    // The day is closed now.
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    assert_eq!(engine.last_reduced(), Some(date));
    assert!(engine.reduce().await.is_none());
    harness.source.push(counters(130, 80, 16));
    assert!(!engine.capture().await);
    assert_eq!(harness.daily_log.read(date).await.unwrap().len(), 2);
}

#[tokio::test]
async fn daily_reduce_with_one_snapshot_is_silent() {
    let harness = Harness::new(vec![counters(100, 50, 10)], noon());
    let mut engine = DailyAggregationEngine::new(config(), harness.services());

    assert!(engine.capture().await);
    assert!(engine.reduce().await.is_none());

    assert!(harness.notifier.deliveries().is_empty());
    let summaries = harness.daily_log.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].delta, None);
}

#[tokio::test]
async fn daily_capture_skips_partial_snapshots() {
    let partial = Some(ProfileSnapshot {
        followers: Some(10),
        ..Default::default()
    });
    let harness = Harness::new(vec![partial, None], noon());
    let mut engine = DailyAggregationEngine::new(config(), harness.services());

    assert!(!engine.capture().await);
    assert!(!engine.capture().await);
    let date = noon().date_naive();
    assert_eq!(harness.daily_log.read(date).await.unwrap(), Vec::<SnapshotRecord>::new());
}

#[tokio::test]
async fn daily_engine_restores_finalized_day() {
    let harness = Harness::new(vec![counters(1, 1, 1)], noon());
    harness
        .daily_log
        .record_summary(&orchestrator::persistence::DailySummaryRecord {
            date: noon().date_naive(),
            delta: None,
            reduced_at: noon(),
        })
        .await
        .unwrap();

    let services = Services {
        session_log: Arc::new(NoopSessionLog),
        ..harness.services()
    };
    let mut engine = DailyAggregationEngine::new(config(), services);
    engine.restore().await;

    assert_eq!(engine.last_reduced(), Some(noon().date_naive()));
    assert!(!engine.capture().await);
    assert_eq!(harness.source.fetches(), 0);
}

fn daily_config(time_gmt: &str) -> Arc<Config> {
    let mut config = Config {
        username: "creator".to_owned(),
        ..Config::default()
    };
    config.intervals.daily = 60;
    config.daily_summary.time_gmt = time_gmt.parse().unwrap();
    Arc::new(config)
}

/// Hourly counters with followers counting up from 100.
fn hourly_script(count: u64) -> Vec<Option<ProfileSnapshot>> {
    (0..count).map(|i| counters(100 + i, 50 + i, 10)).collect()
}

#[tokio::test]
async fn daily_loop_with_midnight_trigger_reduces_previous_day() {
    let cancel = CancellationToken::new();
    let harness = Harness::new(Vec::new(), noon());
    let source = Arc::new(ScriptedSource::new(hourly_script(20)).cancel_when_exhausted(cancel.clone()));
    let services = Services {
        source: source.clone(),
        ..harness.services()
    };
    let engine = DailyAggregationEngine::new(daily_config("00:00"), services);

    tokio::time::timeout(Duration::from_secs(10), engine.run_until(cancel))
        .await
        .expect("loop stops once the script runs out");

    // 12:00 through 23:00 on the first day, 00:00 through 07:00 on the next.
    let first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let second = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    assert_eq!(harness.daily_log.read(first).await.unwrap().len(), 12);
    assert_eq!(harness.daily_log.read(second).await.unwrap().len(), 8);

    let summaries = harness.daily_log.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].date, first);
    match harness.notifier.notifications().as_slice() {
        [Notification::DailySummary(report)] => {
            assert_eq!(report.date, first);
            assert_eq!(report.followers_gained, 11);
            assert_eq!(report.followers, 111);
        }
        other => panic!("unexpected notifications {other:?}"),
    }
}

#[tokio::test]
async fn daily_loop_keeps_capturing_after_a_late_trigger() {
    let cancel = CancellationToken::new();
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
    let harness = Harness::new(Vec::new(), start);
    let source = Arc::new(ScriptedSource::new(hourly_script(4)).cancel_when_exhausted(cancel.clone()));
    let services = Services {
        source: source.clone(),
        ..harness.services()
    };
    let engine = DailyAggregationEngine::new(daily_config("23:00"), services);

    tokio::time::timeout(Duration::from_secs(10), engine.run_until(cancel))
        .await
        .expect("loop stops once the script runs out");

    // The 23:00 snapshot lands before the day closes.
    let first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let second = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    assert_eq!(harness.daily_log.read(first).await.unwrap().len(), 2);
    assert_eq!(harness.daily_log.read(second).await.unwrap().len(), 2);
    match harness.notifier.notifications().as_slice() {
        [Notification::DailySummary(report)] => {
            assert_eq!(report.date, first);
            assert_eq!(report.followers_gained, 1);
        }
        other => panic!("unexpected notifications {other:?}"),
    }
}
