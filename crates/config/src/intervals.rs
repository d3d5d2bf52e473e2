#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

pub const MIN_OFFLINE_MINUTES: u64 = 5;
pub const MIN_LIVE_SUMMARY_MINUTES: u64 = 5;
pub const MIN_VIDEO_MINUTES: u64 = 5;
pub const MIN_DAILY_MINUTES: u64 = 1;
pub const MIN_LIVE_CHECK: Duration = Duration::from_secs(5);
pub const MIN_FETCH_TIMEOUT: Duration = Duration::from_secs(1);

#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Intervals {
    /// Offline polling cadence in minutes.
    pub offline: u64,
    /// Live summary refresh cadence in minutes.
    pub live_summary: u64,
    /// New video check cadence in minutes.
    pub video: u64,
    /// Daily snapshot capture cadence in minutes.
    pub daily: u64,
    /// End-of-session detection cadence in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub live_check: Duration,
    /// Upper bound for a single profile fetch, in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub fetch_timeout: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            offline: 10,
            live_summary: 10,
            video: 15,
            daily: 60,
            live_check: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

impl Intervals {
    /// Raise every interval to its minimum.
    pub fn clamp(self) -> Self {
        Self {
            offline: self.offline.max(MIN_OFFLINE_MINUTES),
            live_summary: self.live_summary.max(MIN_LIVE_SUMMARY_MINUTES),
            video: self.video.max(MIN_VIDEO_MINUTES),
            daily: self.daily.max(MIN_DAILY_MINUTES),
            live_check: self.live_check.max(MIN_LIVE_CHECK),
            fetch_timeout: self.fetch_timeout.max(MIN_FETCH_TIMEOUT),
        }
    }

    pub fn offline_period(&self) -> Duration {
        minutes(self.offline)
    }

    pub fn live_summary_period(&self) -> Duration {
        minutes(self.live_summary)
    }

    pub fn video_period(&self) -> Duration {
        minutes(self.video)
    }

    pub fn daily_period(&self) -> Duration {
        minutes(self.daily)
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}
