#![forbid(unsafe_code)]

use crate::domain::DailyDelta;
use chrono::{DateTime, NaiveDate, Utc};
use oracle::ProfileSnapshot;
use serde::{Deserialize, Serialize};

/// One line of a daily log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub followers: u64,
    pub likes: u64,
    pub views: u64,
    pub captured_at: DateTime<Utc>,
}

impl SnapshotRecord {
    /// `None` unless all three counters are present; a missing counter is
    /// not a zero.
    pub fn from_snapshot(snapshot: &ProfileSnapshot, captured_at: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            followers: snapshot.followers?,
            likes: snapshot.likes?,
            views: snapshot.views?,
            captured_at,
        })
    }
}

/// A finalized day, appended once its reduce step ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummaryRecord {
    pub date: NaiveDate,
    pub delta: Option<DailyDelta>,
    pub reduced_at: DateTime<Utc>,
}

/// Final figures of a finished live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub peak_viewers: u64,
    pub total_likes: u64,
    pub total_gifts: u64,
    pub title: Option<String>,
}
