#![forbid(unsafe_code)]

use chrono::{TimeZone, Utc};
use config::Config;
use oracle::{ProfileSnapshot, ScriptedSource};
use orchestrator::notify::{Notification, RecordingNotifier};
use orchestrator::persistence::{MemoryDailyLog, NoopSessionLog};
use orchestrator::{ControlEvent, ManualClock, Orchestrator, Services};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn snapshot(live: bool, viewers: u64) -> Option<ProfileSnapshot> {
    Some(ProfileSnapshot {
        live: Some(live),
        viewer_count: Some(viewers),
        ..Default::default()
    })
}

fn quiet_config() -> Config {
    let mut config = Config {
        username: "creator".to_owned(),
        ..Config::default()
    };
    config.features.livesummary = false;
    config.features.video_notifications = false;
    config.features.daily_summary = false;
    config
}

#[tokio::test]
async fn session_is_announced_and_summarized_once() {
    let cancel = CancellationToken::new();
    let mut script = vec![
        snapshot(false, 0),
        snapshot(true, 10),
        snapshot(true, 40),
        snapshot(true, 25),
    ];
    script.extend(std::iter::repeat_n(snapshot(false, 0), 8));
    let source = Arc::new(ScriptedSource::new(script).cancel_when_exhausted(cancel.clone()));
    let notifier = Arc::new(RecordingNotifier::new());
    let services = Services {
        source: source.clone(),
        notifier: notifier.clone(),
        daily_log: Arc::new(MemoryDailyLog::default()),
        session_log: Arc::new(NoopSessionLog),
        clock: Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
        )),
    };

    let (control_tx, control_rx) = mpsc::unbounded_channel();
    control_tx.send(ControlEvent::DumpStatus).unwrap();

    let mut orchestrator = Orchestrator::new(quiet_config(), services);
    tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.run_until(cancel, control_rx),
    )
    .await
    .expect("orchestrator stops once the script runs out");

    assert_eq!(orchestrator.sessions_started(), 1);
    assert_eq!(orchestrator.sessions_finished(), 1);
    assert!(!orchestrator.session_active());

    let notifications = notifier.notifications();
    assert_eq!(notifications.len(), 2, "{notifications:?}");
    match (&notifications[0], &notifications[1]) {
        (Notification::LiveStart(start), Notification::FinalSummary(summary)) => {
            assert_eq!(start.viewers, Some(10));
            assert_eq!(summary.username, "creator");
            assert!(summary.peak_viewers >= 10);
            assert!(summary.peak_viewers <= 40);
        }
        other => panic!("unexpected notifications {other:?}"),
    }
}

#[tokio::test]
async fn maintenance_mode_idles_every_engine() {
    let cancel = CancellationToken::new();
    let source = Arc::new(ScriptedSource::new([snapshot(true, 10)]));
    let notifier = Arc::new(RecordingNotifier::new());
    let services = Services {
        source: source.clone(),
        notifier: notifier.clone(),
        daily_log: Arc::new(MemoryDailyLog::default()),
        session_log: Arc::new(NoopSessionLog),
        clock: Arc::new(ManualClock::new(Utc::now())),
    };
    let mut config = Config::default();
    config.system.maintenance = true;

    let stop = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.cancel();
    });

    let (_control_tx, control_rx) = mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::new(config, services);
    tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.run_until(cancel, control_rx),
    )
    .await
    .expect("orchestrator stops on cancel");

    assert_eq!(source.fetches(), 0);
    assert!(notifier.deliveries().is_empty());
    assert_eq!(orchestrator.sessions_started(), 0);
}
