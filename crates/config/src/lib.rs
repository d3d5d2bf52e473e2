#![forbid(unsafe_code)]

mod daily;
mod error;
mod features;
mod intervals;
mod persistence;

pub use daily::{DailySummary, DailyTime, InvalidDailyTime};
pub use error::Error;
pub use features::{Destinations, Feature, Features};
pub use intervals::Intervals;
pub use persistence::Persistence;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values, with `__`
/// separating nested keys (`TOKWATCH_INTERVALS__OFFLINE=7`).
pub const ENV_PREFIX: &str = "TOKWATCH_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Profile being watched, without the leading `@`.
    pub username: String,
    pub features: Features,
    pub intervals: Intervals,
    pub daily_summary: DailySummary,
    /// Destination per notification feature.
    pub channels: Destinations,
    /// Role mentioned alongside each notification feature.
    pub roles: Destinations,
    pub system: System,
    pub persistence: Persistence,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct System {
    /// While set, every engine idles without fetching.
    pub maintenance: bool,
}

impl Config {
    /// Built-in defaults overlaid with the environment.
    pub fn new() -> Result<Self, Error> {
        Self::extract(Self::figment())
    }

    /// Defaults, then the TOML file at `path`, then the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let rendered = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    /// Apply the same normalization `load` does.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().trim_start_matches('@').to_owned();
        self.intervals = self.intervals.clamp();
        self
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, Error> {
        let config: Config = figment.extract()?;
        Ok(config.normalized())
    }
}
