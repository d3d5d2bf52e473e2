#![forbid(unsafe_code)]

use crate::error::Error;
use crate::persistence::{DailySummaryRecord, SnapshotRecord, append_jsonl, read_jsonl};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

const SUMMARIES_FILE: &str = "summaries.jsonl";

/// Append-only per-UTC-day snapshot log.
#[async_trait]
pub trait DailyLogStore: Send + Sync {
    /// Append one record to the log of `date`.
    async fn append(&self, date: NaiveDate, record: &SnapshotRecord) -> Result<(), Error>;
    /// Records of `date` in insertion order.
    async fn read(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, Error>;
    /// Mark a day as finalized.
    async fn record_summary(&self, summary: &DailySummaryRecord) -> Result<(), Error>;
    /// Most recent finalized day, if any.
    async fn last_reduced(&self) -> Result<Option<NaiveDate>, Error>;
}

#[derive(Debug, Default)]
pub struct MemoryDailyLog {
    days: Mutex<BTreeMap<NaiveDate, Vec<SnapshotRecord>>>,
    summaries: Mutex<Vec<DailySummaryRecord>>,
}

impl MemoryDailyLog {
    pub fn summaries(&self) -> Vec<DailySummaryRecord> {
        self.summaries.lock().clone()
    }
}

#[async_trait]
impl DailyLogStore for MemoryDailyLog {
    async fn append(&self, date: NaiveDate, record: &SnapshotRecord) -> Result<(), Error> {
        self.days.lock().entry(date).or_default().push(record.clone());
        Ok(())
    }

    async fn read(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, Error> {
        Ok(self.days.lock().get(&date).cloned().unwrap_or_default())
    }

    async fn record_summary(&self, summary: &DailySummaryRecord) -> Result<(), Error> {
        self.summaries.lock().push(summary.clone());
        Ok(())
    }

    async fn last_reduced(&self) -> Result<Option<NaiveDate>, Error> {
        Ok(self.summaries.lock().iter().map(|s| s.date).max())
    }
}

/// One `YYYY-MM-DD.jsonl` file per day plus a `summaries.jsonl` ledger.
#[derive(Debug, Clone)]
pub struct JsonlDailyLog {
    dir: PathBuf,
}

impl JsonlDailyLog {
    pub async fn new(dir: PathBuf) -> Result<Self, Error> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.jsonl", date.format("%Y-%m-%d")))
    }

    fn summaries_path(&self) -> PathBuf {
        self.dir.join(SUMMARIES_FILE)
    }
}

#[async_trait]
impl DailyLogStore for JsonlDailyLog {
    async fn append(&self, date: NaiveDate, record: &SnapshotRecord) -> Result<(), Error> {
        let path = self.day_path(date);
        append_jsonl(&path, record).await?;
        debug!(path = %path.display(), "snapshot appended");
        Ok(())
    }

    async fn read(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, Error> {
        read_jsonl(&self.day_path(date)).await
    }

    async fn record_summary(&self, summary: &DailySummaryRecord) -> Result<(), Error> {
        append_jsonl(&self.summaries_path(), summary).await
    }

    async fn last_reduced(&self) -> Result<Option<NaiveDate>, Error> {
        let summaries: Vec<DailySummaryRecord> = read_jsonl(&self.summaries_path()).await?;
        Ok(summaries.into_iter().map(|s| s.date).max())
    }
}
