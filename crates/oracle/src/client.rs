#![forbid(unsafe_code)]

use crate::extract::{ExtractorChain, Page};
use crate::{FetchError, ProfileSnapshot, ProfileSource};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; Mobile) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

pub fn profile_url(username: &str) -> String {
    format!("https://www.tiktok.com/@{}", username.trim_start_matches('@'))
}

/// Fetches the public profile page and runs the extractor chain over it.
///
/// One request per call, no retries; the caller owns the retry cadence.
pub struct ProfileOracle {
    client: reqwest::Client,
    username: String,
    url: String,
    chain: ExtractorChain,
}

impl ProfileOracle {
    pub fn new(username: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let username = username.into().trim_start_matches('@').to_owned();
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: profile_url(&username),
            username,
            chain: ExtractorChain::default(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Run the extractor chain over an already fetched page.
    pub fn parse(&self, html: &str) -> Result<ProfileSnapshot, FetchError> {
        self.chain
            .extract(Page {
                username: &self.username,
                html,
            })
            .ok_or(FetchError::NoData)
    }
}

#[async_trait]
impl ProfileSource for ProfileOracle {
    async fn fetch(&self) -> Result<ProfileSnapshot, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let html = response.text().await?;
        let snapshot = self.parse(&html)?;
        debug!(url = %self.url, ?snapshot, "profile fetched");
        Ok(snapshot)
    }
}
