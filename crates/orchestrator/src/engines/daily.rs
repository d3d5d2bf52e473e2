#![forbid(unsafe_code)]

use crate::domain::{DailyDelta, reduce_day};
use crate::engine::Services;
use crate::engines::{fetch, pause};
use crate::notify::{DailyReport, Notification, publish};
use crate::persistence::{DailySummaryRecord, SnapshotRecord};
use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use config::{Config, DailyTime, Feature};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// First trigger of `time` strictly after `now`, in UTC.
pub fn next_reduce_after(now: DateTime<Utc>, time: DailyTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(time.time()).and_utc();
    if today > now {
        return today;
    }
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(time.time()).and_utc())
        .unwrap_or(today)
}

fn closed_day(trigger: DateTime<Utc>) -> NaiveDate {
    (trigger - TimeDelta::seconds(1)).date_naive()
}

/// Captures snapshots into the day's log and reduces each day exactly once
/// at the configured UTC time. Both steps share one clock.
pub struct DailyAggregationEngine {
    config: Arc<Config>,
    services: Services,
    last_reduced: Option<NaiveDate>,
}

impl DailyAggregationEngine {
    pub fn new(config: Arc<Config>, services: Services) -> Self {
        Self {
            config,
            services,
            last_reduced: None,
        }
    }

    pub fn last_reduced(&self) -> Option<NaiveDate> {
        self.last_reduced
    }

    /// Seed the finalized-day marker from the store.
    pub async fn restore(&mut self) {
        match self.services.daily_log.last_reduced().await {
            Ok(last) => {
                debug!(?last, "restored last reduced day");
                self.last_reduced = last;
            }
            Err(err) => warn!(%err, "could not read summary ledger"),
        }
    }

    fn is_finalized(&self, date: NaiveDate) -> bool {
        self.last_reduced.is_some_and(|last| date <= last)
    }

    fn is_idle(&self) -> bool {
        if self.config.system.maintenance {
            debug!("maintenance mode; daily aggregation idle");
            return true;
        }
        if !self.config.features.is_enabled(Feature::DailySummary) {
            debug!("daily summary disabled");
            return true;
        }
        false
    }

    /// Append one snapshot to today's log. Returns whether a record was
    /// written.
    pub async fn capture(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        let date = self.services.clock.now().date_naive();
        if self.is_finalized(date) {
            debug!(%date, "day already reduced; capture refused");
            return false;
        }

        let Some(snapshot) = fetch(
            self.services.source.as_ref(),
            self.config.intervals.fetch_timeout,
        )
        .await
        else {
            return false;
        };
        let captured_at = self.services.clock.now();
        let Some(record) = SnapshotRecord::from_snapshot(&snapshot, captured_at) else {
            debug!("snapshot lacks counters; capture skipped");
            return false;
        };
        // The fetch may have straddled midnight.
        let date = captured_at.date_naive();
        if self.is_finalized(date) {
            return false;
        }
        match self.services.daily_log.append(date, &record).await {
            Ok(()) => {
                debug!(%date, followers = record.followers, "snapshot captured");
                true
            }
            Err(err) => {
                warn!(%err, %date, "snapshot not written");
                false
            }
        }
    }

    /// Finalize the UTC day of the instant just before now. Returns the delta
    /// when one was computed.
    pub async fn reduce(&mut self) -> Option<DailyDelta> {
        let now = self.services.clock.now();
        self.reduce_at(now).await
    }

    /// Finalize the UTC day closed by a trigger at `trigger`: the date of the
    /// instant just before it, so a `00:00` trigger closes the previous day.
    pub async fn reduce_at(&mut self, trigger: DateTime<Utc>) -> Option<DailyDelta> {
        if self.is_idle() {
            return None;
        }
        let now = self.services.clock.now();
        let date = closed_day(trigger);
        if self.is_finalized(date) {
            debug!(%date, "day already reduced");
            return None;
        }

        let records = match self.services.daily_log.read(date).await {
            Ok(records) => records,
            Err(err) => {
                warn!(%err, %date, "daily log unreadable; reduce skipped");
                return None;
            }
        };
        let delta = reduce_day(date, &records);
        if delta.is_none() {
            warn!(%date, snapshots = records.len(), "fewer than two snapshots; no daily summary");
        }

        let summary = DailySummaryRecord {
            date,
            delta: delta.clone(),
            reduced_at: now,
        };
        if let Err(err) = self.services.daily_log.record_summary(&summary).await {
            warn!(%err, %date, "summary ledger not written");
        }
        self.last_reduced = Some(date);

        let delta = delta?;
        info!(
            %date,
            followers = delta.followers_gained,
            likes = delta.likes_gained,
            views = delta.views_gained,
            "day reduced"
        );
        publish(
            self.services.notifier.as_ref(),
            &self.config.features,
            &Notification::DailySummary(DailyReport::from_delta(&self.config.username, &delta)),
        )
        .await;
        Some(delta)
    }

    pub async fn run_until(mut self, cancel: CancellationToken) {
        self.restore().await;

        let capture_every = self.config.intervals.daily_period();
        let reduce_at = self.config.daily_summary.time_gmt;
        let now = self.services.clock.now();
        let mut next_capture = now;
        let mut next_reduce = next_reduce_after(now, reduce_at);
        info!(?capture_every, %reduce_at, %next_reduce, "daily aggregation started");

        while !cancel.is_cancelled() {
            let now = self.services.clock.now();
            // A snapshot due at the trigger still belongs to the closing day.
            if now >= next_capture {
                self.capture().await;
                next_capture = now + capture_every;
            }
            if now >= next_reduce {
                self.reduce_at(next_reduce).await;
                next_reduce = next_reduce_after(now, reduce_at);
            }

            let now = self.services.clock.now();
            let wake = next_capture.min(next_reduce);
            let wait = (wake - now).to_std().unwrap_or(Duration::ZERO);
            if !pause(self.services.clock.as_ref(), wait, &cancel).await {
                break;
            }
        }
        info!("daily aggregation stopped");
    }
}
