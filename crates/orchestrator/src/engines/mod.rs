#![forbid(unsafe_code)]

//! The cooperating loops. Each engine owns its state exclusively, exposes a
//! `tick` that performs one iteration without sleeping, and a `run_until`
//! that loops until its cancellation token fires. Cancellation is checked
//! at the top of every iteration and during the sleep, never mid-fetch.

mod daily;
mod final_summary;
mod live_session;
mod live_summary;
mod polling;
mod video_watch;

pub use daily::{DailyAggregationEngine, next_reduce_after};
pub use final_summary::FinalSummaryEngine;
pub use live_session::LiveSessionEngine;
pub use live_summary::LiveSummaryEngine;
pub use polling::PollingEngine;
pub use video_watch::VideoWatchEngine;

use crate::clock::Clock;
use oracle::{FetchError, ProfileSnapshot, ProfileSource};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fetch under a hard deadline. Any failure is "no information".
pub(crate) async fn fetch(source: &dyn ProfileSource, timeout: Duration) -> Option<ProfileSnapshot> {
    let outcome = tokio::time::timeout(timeout, source.fetch())
        .await
        .unwrap_or(Err(FetchError::Timeout));
    match outcome {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            debug!(%err, "fetch yielded no information");
            None
        }
    }
}

/// Sleep for `period` unless cancelled first. Returns `false` on cancel.
pub(crate) async fn pause(clock: &dyn Clock, period: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = clock.sleep(period) => true,
    }
}
