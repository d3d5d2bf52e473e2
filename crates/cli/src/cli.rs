use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// Tokwatch: a TikTok creator monitor
///
/// Tokwatch follows one public profile and posts live-start, live-summary,
/// final-summary, new-video and daily-growth notifications to chat webhooks.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Without it, defaults and `TOKWATCH_*` environment variables are used.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    /// Path to log file.
    ///
    /// Empty string means log to stderr.
    #[arg(short, long)]
    pub logfile: Option<PathBuf>,

    /// Profile to monitor, overriding the configuration.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Log notifications instead of delivering them.
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch the profile once, log the snapshot and exit.
    #[arg(long)]
    pub probe: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

impl Cli {
    /// Log file to append to, if any.
    pub fn logfile(&self) -> Option<&Path> {
        self.logfile
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
