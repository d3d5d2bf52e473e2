#![forbid(unsafe_code)]

mod daily_log;
mod jsonl;
mod records;
mod session_log;

pub use daily_log::{DailyLogStore, JsonlDailyLog, MemoryDailyLog};
pub use jsonl::{append_jsonl, read_jsonl};
pub use records::{DailySummaryRecord, SessionRecord, SnapshotRecord};
pub use session_log::{JsonlSessionLog, NoopSessionLog, SessionLog};
