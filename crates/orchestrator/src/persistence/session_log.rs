#![forbid(unsafe_code)]

use crate::error::Error;
use crate::persistence::{SessionRecord, append_jsonl};
use async_trait::async_trait;
use std::path::PathBuf;

const SESSIONS_FILE: &str = "sessions.jsonl";

#[async_trait]
pub trait SessionLog: Send + Sync {
    async fn append(&self, record: &SessionRecord) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub struct NoopSessionLog;

#[async_trait]
impl SessionLog for NoopSessionLog {
    async fn append(&self, _record: &SessionRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonlSessionLog {
    path: PathBuf,
}

impl JsonlSessionLog {
    pub async fn new(dir: PathBuf) -> Result<Self, Error> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            path: dir.join(SESSIONS_FILE),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl SessionLog for JsonlSessionLog {
    async fn append(&self, record: &SessionRecord) -> Result<(), Error> {
        append_jsonl(&self.path, record).await
    }
}
