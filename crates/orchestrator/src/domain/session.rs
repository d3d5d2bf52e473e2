#![forbid(unsafe_code)]

use chrono::{DateTime, TimeDelta, Utc};
use oracle::ProfileSnapshot;
use serde::{Deserialize, Serialize};

/// Running figures of one live broadcast.
///
/// Created on a confirmed start edge and dropped on a confirmed end edge.
/// `peak_viewer_count >= last_viewer_count` holds after every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub started_at: DateTime<Utc>,
    pub last_viewer_count: u64,
    pub peak_viewer_count: u64,
    /// Highest like count seen; never decreases.
    pub total_likes: u64,
    /// Gift value accumulated over the session.
    pub total_gifts: u64,
    pub title: Option<String>,
    pub room_id: Option<String>,
    pub last_observed_at: DateTime<Utc>,
    /// Last raw gift counter, the baseline for the next delta.
    gift_counter: Option<u64>,
}

impl SessionState {
    pub fn start(at: DateTime<Utc>, snapshot: &ProfileSnapshot) -> Self {
        let mut state = Self {
            started_at: at,
            last_viewer_count: 0,
            peak_viewer_count: 0,
            total_likes: 0,
            total_gifts: 0,
            title: None,
            room_id: None,
            last_observed_at: at,
            gift_counter: None,
        };
        state.observe(at, snapshot);
        state
    }

    /// Fold a live observation. Absent fields leave their figure untouched,
    /// and a snapshot that is not positively live is ignored.
    pub fn observe(&mut self, at: DateTime<Utc>, snapshot: &ProfileSnapshot) {
        if !snapshot.is_live() {
            return;
        }
        if let Some(viewers) = snapshot.viewer_count {
            self.last_viewer_count = viewers;
            self.peak_viewer_count = self.peak_viewer_count.max(viewers);
        }
        if let Some(likes) = snapshot.likes {
            self.total_likes = self.total_likes.max(likes);
        }
        if let Some(counter) = snapshot.gifts {
            self.record_gift_counter(counter);
        }
        if snapshot.live_title.is_some() {
            self.title.clone_from(&snapshot.live_title);
        }
        if snapshot.room_id.is_some() {
            self.room_id.clone_from(&snapshot.room_id);
        }
        self.last_observed_at = self.last_observed_at.max(at);
    }

    /// Gift counters are cumulative per room. The increase since the last
    /// reading is added; a counter that went backwards is a fresh room and
    /// counts in full.
    fn record_gift_counter(&mut self, counter: u64) {
        let delta = match self.gift_counter {
            Some(previous) if counter >= previous => counter - previous,
            _ => counter,
        };
        self.total_gifts = self.total_gifts.saturating_add(delta);
        self.gift_counter = Some(counter);
    }

    /// Combine with another observer's copy of the same session: monotonic
    /// figures take the maximum, `last_viewer_count` the fresher reading.
    pub fn merge(&mut self, other: &SessionState) {
        if other.last_observed_at > self.last_observed_at {
            self.last_viewer_count = other.last_viewer_count;
            self.last_observed_at = other.last_observed_at;
            self.gift_counter = other.gift_counter;
            if other.title.is_some() {
                self.title.clone_from(&other.title);
            }
            if other.room_id.is_some() {
                self.room_id.clone_from(&other.room_id);
            }
        }
        self.started_at = self.started_at.min(other.started_at);
        self.peak_viewer_count = self
            .peak_viewer_count
            .max(other.peak_viewer_count)
            .max(self.last_viewer_count);
        self.total_likes = self.total_likes.max(other.total_likes);
        self.total_gifts = self.total_gifts.max(other.total_gifts);
    }

    /// Wall-clock length of the session up to `until`, never negative.
    pub fn duration(&self, until: DateTime<Utc>) -> TimeDelta {
        (until - self.started_at).max(TimeDelta::zero())
    }
}
