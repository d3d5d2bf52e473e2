#![forbid(unsafe_code)]

//! Ranked extraction strategies over a raw profile page.
//!
//! Each [`Extractor`] returns a partial snapshot or an error. The
//! [`ExtractorChain`] runs them in priority order and merges the results field
//! by field, so a broken primary strategy still leaves whatever the fallbacks
//! could recover.

mod pattern;
mod sigi;
mod universal;

pub use pattern::PatternExtractor;
pub use sigi::SigiStateExtractor;
pub use universal::UniversalDataExtractor;

use crate::ProfileSnapshot;
use serde_json::Value;
use tracing::trace;

/// Raw payload of one profile fetch.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub username: &'a str,
    pub html: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("embedded state blob not found")]
    MissingBlob,

    #[error("embedded state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile `{0}` not present in embedded state")]
    MissingUser(String),

    #[error("no recognisable fields")]
    NoFields,
}

pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, page: Page<'_>) -> Result<ProfileSnapshot, ExtractError>;
}

pub struct ExtractorChain {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorChain {
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// Run every extractor and merge. `None` when nothing was recovered.
    pub fn extract(&self, page: Page<'_>) -> Option<ProfileSnapshot> {
        let merged = self
            .extractors
            .iter()
            .filter_map(|extractor| match extractor.extract(page) {
                Ok(partial) => Some(partial),
                Err(err) => {
                    trace!(extractor = extractor.name(), %err, "extractor yielded nothing");
                    None
                }
            })
            .fold(ProfileSnapshot::default(), ProfileSnapshot::merge);

        (!merged.is_empty()).then_some(merged)
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SigiStateExtractor),
            Box::new(UniversalDataExtractor),
            Box::new(PatternExtractor),
        ])
    }
}

/// Numbers show up both as JSON numbers and as decimal strings.
pub(crate) fn as_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Live flag from a user object: an explicit `isLive` wins, otherwise a
/// non-empty room id means live.
pub(crate) fn live_flag(user: &Value) -> Option<bool> {
    if let Some(flag) = user.get("isLive").and_then(Value::as_bool) {
        return Some(flag);
    }
    match user.get("roomId")? {
        Value::String(room) => Some(!room.trim().is_empty() && room != "0"),
        Value::Number(n) => Some(n.as_u64().is_some_and(|id| id != 0)),
        Value::Null => Some(false),
        _ => None,
    }
}

/// Look up a profile keyed by username, tolerating case differences and
/// single-entry maps keyed by an internal id. A lone entry that names a
/// different `uniqueId` is not the target.
pub(crate) fn find_profile<'v>(map: &'v Value, username: &str) -> Option<&'v Value> {
    let object = map.as_object()?;
    if let Some(exact) = object.get(username) {
        return Some(exact);
    }
    object
        .iter()
        .find(|(key, value)| {
            key.eq_ignore_ascii_case(username)
                || value
                    .get("uniqueId")
                    .and_then(Value::as_str)
                    .is_some_and(|id| id.eq_ignore_ascii_case(username))
        })
        .map(|(_, value)| value)
        .or_else(|| {
            let mut values = object.values();
            match (values.next(), values.next()) {
                (Some(only), None) if only.get("uniqueId").is_none() => Some(only),
                _ => None,
            }
        })
}
