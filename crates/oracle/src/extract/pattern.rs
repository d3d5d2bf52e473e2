#![forbid(unsafe_code)]

use super::{ExtractError, Extractor, Page};
use crate::ProfileSnapshot;
use regex::Regex;
use std::sync::LazyLock;

static FOLLOWERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""followerCount"\s*:\s*"?(\d+)"#).expect("valid regex"));
static LIKES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""heartCount"\s*:\s*"?(\d+)"#).expect("valid regex"));
static VIDEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"/video/(\d+)"#).expect("valid regex"));

/// Last resort: scrape the few fields recoverable without a parseable blob.
///
/// Never reports a live flag, so a pattern-only result can not move any edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl Extractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, page: Page<'_>) -> Result<ProfileSnapshot, ExtractError> {
        let capture = |re: &Regex| {
            re.captures(page.html)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().to_owned())
        };

        let snapshot = ProfileSnapshot {
            followers: capture(&FOLLOWERS).and_then(|v| v.parse().ok()),
            likes: capture(&LIKES).and_then(|v| v.parse().ok()),
            latest_video_id: capture(&VIDEO),
            ..Default::default()
        };
        if snapshot.is_empty() {
            return Err(ExtractError::NoFields);
        }
        Ok(snapshot)
    }
}
