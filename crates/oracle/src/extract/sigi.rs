#![forbid(unsafe_code)]

use super::{ExtractError, Extractor, Page, as_count, as_text, find_profile, live_flag};
use crate::ProfileSnapshot;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static SIGI_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="SIGI_STATE"[^>]*>(.*?)</script>"#).expect("valid regex")
});

/// Reads the `SIGI_STATE` blob that older profile pages embed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SigiStateExtractor;

impl Extractor for SigiStateExtractor {
    fn name(&self) -> &'static str {
        "sigi_state"
    }

    fn extract(&self, page: Page<'_>) -> Result<ProfileSnapshot, ExtractError> {
        let raw = SIGI_STATE
            .captures(page.html)
            .and_then(|cap| cap.get(1))
            .ok_or(ExtractError::MissingBlob)?;
        let state: Value = serde_json::from_str(raw.as_str())?;

        let user = find_profile(&state["UserModule"]["users"], page.username);
        let stats = find_profile(&state["UserModule"]["stats"], page.username);
        if user.is_none() && stats.is_none() {
            return Err(ExtractError::MissingUser(page.username.to_owned()));
        }

        let mut snapshot = ProfileSnapshot::default();
        if let Some(user) = user {
            snapshot.live = live_flag(user);
            snapshot.room_id = as_text(user.get("liveRoomId")).or(as_text(user.get("roomId")));
            snapshot.live_title = as_text(user.get("liveTitle"));
            snapshot.viewer_count = as_count(user.get("liveViewerCount"));
            snapshot.gifts = as_count(user.get("liveGiftCount"));
        }
        if let Some(stats) = stats {
            snapshot.followers = as_count(stats.get("followerCount"));
            snapshot.likes = as_count(stats.get("heartCount"));
            snapshot.views = as_count(stats.get("videoCount"));
        }
        snapshot.latest_video_id = latest_video(&state);

        // live metadata only makes sense while live
        if !snapshot.is_live() {
            snapshot.room_id = None;
            snapshot.live_title = None;
            snapshot.viewer_count = None;
            snapshot.gifts = None;
        }

        Ok(snapshot)
    }
}

fn latest_video(state: &Value) -> Option<String> {
    let listed = state["ItemList"]["user-post"]["list"]
        .as_array()
        .and_then(|list| list.first())
        .and_then(|first| as_text(Some(first)));
    listed.or_else(|| {
        // Object keys come back sorted, not in page order; ids grow with time.
        state["ItemModule"]
            .as_object()?
            .iter()
            .filter_map(|(key, item)| {
                let id = as_text(item.get("id")).unwrap_or_else(|| key.clone());
                id.parse::<u64>().ok().map(|numeric| (numeric, id))
            })
            .max_by_key(|(numeric, _)| *numeric)
            .map(|(_, id)| id)
    })
}
