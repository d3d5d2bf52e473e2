#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Persistence {
    /// Root of the append logs. `daily/` and `streams/` are created below it.
    pub data_dir: PathBuf,
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Persistence {
    pub fn daily_dir(&self) -> PathBuf {
        self.data_dir.join("daily")
    }

    pub fn streams_dir(&self) -> PathBuf {
        self.data_dir.join("streams")
    }
}
