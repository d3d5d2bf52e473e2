#![forbid(unsafe_code)]

use super::{ExtractError, Extractor, Page, as_count, as_text, live_flag};
use crate::ProfileSnapshot;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static UNIVERSAL_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__"[^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// Reads the rehydration blob newer profile pages embed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniversalDataExtractor;

impl Extractor for UniversalDataExtractor {
    fn name(&self) -> &'static str {
        "universal_data"
    }

    fn extract(&self, page: Page<'_>) -> Result<ProfileSnapshot, ExtractError> {
        let raw = UNIVERSAL_DATA
            .captures(page.html)
            .and_then(|cap| cap.get(1))
            .ok_or(ExtractError::MissingBlob)?;
        let data: Value = serde_json::from_str(raw.as_str())?;

        let info = &data["__DEFAULT_SCOPE__"]["webapp.user-detail"]["userInfo"];
        let user = &info["user"];
        if user.is_null() {
            return Err(ExtractError::MissingUser(page.username.to_owned()));
        }
        // stats come as numbers, statsV2 as strings; prefer the former
        let stats = &info["stats"];
        let stats_v2 = &info["statsV2"];
        let count = |key: &str| as_count(stats.get(key)).or(as_count(stats_v2.get(key)));

        let live = live_flag(user);
        let snapshot = ProfileSnapshot {
            live,
            room_id: live
                .filter(|live| *live)
                .and_then(|_| as_text(user.get("roomId"))),
            followers: count("followerCount"),
            likes: count("heartCount").or(count("heart")),
            views: count("videoCount"),
            ..Default::default()
        };
        if snapshot.is_empty() {
            return Err(ExtractError::NoFields);
        }
        Ok(snapshot)
    }
}
