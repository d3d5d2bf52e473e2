#![forbid(unsafe_code)]

use crate::domain::{DailyDelta, SessionState};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use config::Feature;
use oracle::profile_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStart {
    pub username: String,
    pub title: Option<String>,
    pub viewers: Option<u64>,
    pub started_at: DateTime<Utc>,
}

/// Figures shared by the running and the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFigures {
    pub username: String,
    pub title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration: TimeDelta,
    pub viewers: u64,
    pub peak_viewers: u64,
    pub total_likes: u64,
    pub total_gifts: u64,
}

impl SessionFigures {
    pub fn from_session(username: &str, session: &SessionState, until: DateTime<Utc>) -> Self {
        Self {
            username: username.to_owned(),
            title: session.title.clone(),
            started_at: session.started_at,
            duration: session.duration(until),
            viewers: session.last_viewer_count,
            peak_viewers: session.peak_viewer_count,
            total_likes: session.total_likes,
            total_gifts: session.total_gifts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub username: String,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReport {
    pub username: String,
    pub date: NaiveDate,
    pub followers_gained: i64,
    pub likes_gained: i64,
    pub views_gained: i64,
    pub followers: u64,
}

impl DailyReport {
    pub fn from_delta(username: &str, delta: &DailyDelta) -> Self {
        Self {
            username: username.to_owned(),
            date: delta.date,
            followers_gained: delta.followers_gained,
            likes_gained: delta.likes_gained,
            views_gained: delta.views_gained,
            followers: delta.followers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    LiveStart(LiveStart),
    /// Edited in place on every refresh.
    LiveSummary(SessionFigures),
    FinalSummary(SessionFigures),
    NewVideo(VideoUpload),
    DailySummary(DailyReport),
}

/// Format-neutral rendering of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub fields: Vec<(&'static str, String)>,
}

impl Notification {
    pub fn feature(&self) -> Feature {
        match self {
            Notification::LiveStart(_) => Feature::LiveNotifications,
            Notification::LiveSummary(_) => Feature::LiveSummary,
            Notification::FinalSummary(_) => Feature::FinalSummary,
            Notification::NewVideo(_) => Feature::VideoNotifications,
            Notification::DailySummary(_) => Feature::DailySummary,
        }
    }

    pub fn render(&self) -> Rendered {
        match self {
            Notification::LiveStart(live) => Rendered {
                title: format!("@{} is LIVE", live.username),
                description: live
                    .title
                    .clone()
                    .unwrap_or_else(|| "TikTok LIVE".to_owned()),
                url: Some(format!("{}/live", profile_url(&live.username))),
                fields: live
                    .viewers
                    .map(|viewers| vec![("Viewers", viewers.to_string())])
                    .unwrap_or_default(),
            },
            Notification::LiveSummary(figures) => Rendered {
                title: format!("@{} live summary", figures.username),
                description: figures
                    .title
                    .clone()
                    .unwrap_or_else(|| "Live in progress".to_owned()),
                url: Some(format!("{}/live", profile_url(&figures.username))),
                fields: vec![
                    ("Live for", format_duration(figures.duration)),
                    ("Viewers", figures.viewers.to_string()),
                    ("Peak viewers", figures.peak_viewers.to_string()),
                    ("Likes", figures.total_likes.to_string()),
                    ("Gifts", figures.total_gifts.to_string()),
                ],
            },
            Notification::FinalSummary(figures) => Rendered {
                title: format!("@{} live ended", figures.username),
                description: figures
                    .title
                    .clone()
                    .unwrap_or_else(|| "Stream summary".to_owned()),
                url: Some(profile_url(&figures.username)),
                fields: vec![
                    ("Duration", format_duration(figures.duration)),
                    ("Peak viewers", figures.peak_viewers.to_string()),
                    ("Likes", figures.total_likes.to_string()),
                    ("Gifts", figures.total_gifts.to_string()),
                ],
            },
            Notification::NewVideo(video) => Rendered {
                title: format!("New video from @{}", video.username),
                description: video_url(&video.username, &video.video_id),
                url: Some(video_url(&video.username, &video.video_id)),
                fields: Vec::new(),
            },
            Notification::DailySummary(report) => Rendered {
                title: format!("@{} daily summary", report.username),
                description: report.date.format("%Y-%m-%d").to_string(),
                url: Some(profile_url(&report.username)),
                fields: vec![
                    ("Followers", report.followers.to_string()),
                    ("Followers gained", signed(report.followers_gained)),
                    ("Likes gained", signed(report.likes_gained)),
                    ("Videos gained", signed(report.views_gained)),
                ],
            },
        }
    }
}

pub fn video_url(username: &str, video_id: &str) -> String {
    format!("{}/video/{video_id}", profile_url(username))
}

/// `1h 02m 03s`, or `15m 30s` below an hour.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
