#![forbid(unsafe_code)]

//! Edge events passed between engines.
//!
//! Engines expose one registration point per edge and send the event on the
//! registered channel after the triggering fetch completes and before their
//! loop moves on. The orchestrator is the only receiver.

use crate::domain::SessionState;
use chrono::{DateTime, Utc};
use oracle::ProfileSnapshot;
use tracing::debug;

pub type Hook<T> = flume::Sender<T>;

/// Offline to live, as seen by the polling loop.
#[derive(Debug, Clone)]
pub struct LiveStarted {
    pub snapshot: ProfileSnapshot,
    pub at: DateTime<Utc>,
}

/// Live to offline, confirmed by the session loop.
#[derive(Debug, Clone)]
pub struct LiveEnded {
    pub session: SessionState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub video_id: String,
    pub previous_id: String,
    pub at: DateTime<Utc>,
}

/// Deliver `event` if a hook is registered. A closed receiver only means
/// nobody is listening any more.
pub(crate) async fn fire<T>(hook: Option<&Hook<T>>, event: T) {
    let Some(hook) = hook else {
        return;
    };
    if hook.send_async(event).await.is_err() {
        debug!("hook receiver dropped");
    }
}
