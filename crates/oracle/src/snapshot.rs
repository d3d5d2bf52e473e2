#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// One fetch's worth of best-effort profile data.
///
/// Every field is optional: an absent value means the source did not report
/// it, which is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// `Some(true)` live, `Some(false)` positively not live, `None` unknown.
    pub live: Option<bool>,
    pub viewer_count: Option<u64>,
    pub followers: Option<u64>,
    pub likes: Option<u64>,
    /// The profile's video count; the page exposes no aggregate play count.
    pub views: Option<u64>,
    pub latest_video_id: Option<String>,
    pub live_title: Option<String>,
    pub room_id: Option<String>,
    /// Cumulative gift counter of the current live room.
    pub gifts: Option<u64>,
}

impl ProfileSnapshot {
    /// A positive live observation.
    pub fn is_live(&self) -> bool {
        self.live == Some(true)
    }

    /// A positive not-live observation.
    pub fn is_offline(&self) -> bool {
        self.live == Some(false)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-by-field merge where values already present in `self` win.
    pub fn merge(self, fallback: ProfileSnapshot) -> ProfileSnapshot {
        ProfileSnapshot {
            live: self.live.or(fallback.live),
            viewer_count: self.viewer_count.or(fallback.viewer_count),
            followers: self.followers.or(fallback.followers),
            likes: self.likes.or(fallback.likes),
            views: self.views.or(fallback.views),
            latest_video_id: self.latest_video_id.or(fallback.latest_video_id),
            live_title: self.live_title.or(fallback.live_title),
            room_id: self.room_id.or(fallback.room_id),
            gifts: self.gifts.or(fallback.gifts),
        }
    }
}
