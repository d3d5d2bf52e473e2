#![forbid(unsafe_code)]

use crate::persistence::SnapshotRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Growth of the profile over one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDelta {
    pub date: NaiveDate,
    pub followers_gained: i64,
    pub likes_gained: i64,
    pub views_gained: i64,
    /// Latest absolute follower count.
    pub followers: u64,
    pub snapshots: usize,
}

/// Reduce a day's log into its delta: last minus first record, in insertion
/// order. Records captured on another date are ignored. Fewer than two
/// records give `None`.
pub fn reduce_day(date: NaiveDate, records: &[SnapshotRecord]) -> Option<DailyDelta> {
    let mut day = records
        .iter()
        .filter(|record| record.captured_at.date_naive() == date);
    let first = day.next()?;
    let (last, count) = day.fold((None, 1usize), |(_, count), record| {
        (Some(record), count + 1)
    });
    let last = last?;

    Some(DailyDelta {
        date,
        followers_gained: gained(first.followers, last.followers),
        likes_gained: gained(first.likes, last.likes),
        views_gained: gained(first.views, last.views),
        followers: last.followers,
        snapshots: count,
    })
}

fn gained(first: u64, last: u64) -> i64 {
    let diff = i128::from(last) - i128::from(first);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}
