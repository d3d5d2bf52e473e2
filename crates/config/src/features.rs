#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-facing notification feature. Each one maps to exactly one
/// destination channel and optional role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LiveNotifications,
    LiveSummary,
    FinalSummary,
    VideoNotifications,
    DailySummary,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::LiveNotifications,
        Feature::LiveSummary,
        Feature::FinalSummary,
        Feature::VideoNotifications,
        Feature::DailySummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::LiveNotifications => "live_notifications",
            Feature::LiveSummary => "livesummary",
            Feature::FinalSummary => "finalsummary",
            Feature::VideoNotifications => "video_notifications",
            Feature::DailySummary => "daily_summary",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Features {
    pub live_notifications: bool,
    pub livesummary: bool,
    pub finalsummary: bool,
    pub video_notifications: bool,
    pub daily_summary: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            live_notifications: true,
            livesummary: true,
            finalsummary: true,
            video_notifications: true,
            daily_summary: true,
        }
    }
}

impl Features {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::LiveNotifications => self.live_notifications,
            Feature::LiveSummary => self.livesummary,
            Feature::FinalSummary => self.finalsummary,
            Feature::VideoNotifications => self.video_notifications,
            Feature::DailySummary => self.daily_summary,
        }
    }
}

/// Per-feature destination table, used for both `[channels]` and `[roles]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Destinations {
    pub live: Option<String>,
    pub livesummary: Option<String>,
    pub finalsummary: Option<String>,
    pub videos: Option<String>,
    pub summary: Option<String>,
}

impl Destinations {
    /// Destination for `feature`, treating blank entries as unset.
    pub fn get(&self, feature: Feature) -> Option<&str> {
        let value = match feature {
            Feature::LiveNotifications => &self.live,
            Feature::LiveSummary => &self.livesummary,
            Feature::FinalSummary => &self.finalsummary,
            Feature::VideoNotifications => &self.videos,
            Feature::DailySummary => &self.summary,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
