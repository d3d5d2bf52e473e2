#![forbid(unsafe_code)]

use crate::{FetchError, ProfileSnapshot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Best-effort view of the monitored profile.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch a fresh snapshot. Failures carry no information about the
    /// profile's state.
    async fn fetch(&self) -> Result<ProfileSnapshot, FetchError>;
}

/// Replays a fixed script of outcomes; `None` entries fail the fetch.
///
/// Once the script runs out every fetch fails and the optional token is
/// cancelled, which lets a test stop the loop it drives.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Option<ProfileSnapshot>>>,
    fetches: AtomicUsize,
    exhausted: Option<CancellationToken>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Option<ProfileSnapshot>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fetches: AtomicUsize::new(0),
            exhausted: None,
        }
    }

    pub fn cancel_when_exhausted(mut self, token: CancellationToken) -> Self {
        self.exhausted = Some(token);
        self
    }

    pub fn push(&self, outcome: Option<ProfileSnapshot>) {
        self.script.lock().push_back(outcome);
    }

    /// Number of fetches served so far, including failed ones.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for ScriptedSource {
    async fn fetch(&self) -> Result<ProfileSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(Some(snapshot)) => Ok(snapshot),
            Some(None) => Err(FetchError::NoData),
            None => {
                if let Some(token) = &self.exhausted {
                    token.cancel();
                }
                Err(FetchError::NoData)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_cancels() {
        let token = CancellationToken::new();
        let source = ScriptedSource::new([
            Some(ProfileSnapshot {
                live: Some(true),
                ..Default::default()
            }),
            None,
        ])
        .cancel_when_exhausted(token.clone());

        assert!(source.fetch().await.unwrap().is_live());
        assert!(matches!(source.fetch().await, Err(FetchError::NoData)));
        assert!(!token.is_cancelled());
        assert!(source.fetch().await.is_err());
        assert!(token.is_cancelled());
        assert_eq!(source.fetches(), 3);
    }
}
