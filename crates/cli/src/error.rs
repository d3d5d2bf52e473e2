use crate::signals::SignalEvent;
use flume::SendError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] io::Error),

    #[error("Failed to send signal event: {0}")]
    SendSignal(#[from] SendError<SignalEvent>),

    #[error("Failed to open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No username configured; set `username` or pass --username")]
    MissingUsername,

    #[error("Failed to set up the profile client: {0}")]
    Oracle(#[from] oracle::FetchError),

    #[error("Failed to set up the notifier: {0}")]
    Notifier(#[from] orchestrator::notify::NotifyError),

    #[error("Failed to open the data directory: {0}")]
    Persistence(#[from] orchestrator::Error),
}
