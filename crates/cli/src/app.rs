use crate::cli::Cli;
use crate::error::Error;
use config::Config;
use oracle::{ProfileOracle, ProfileSource};
use orchestrator::notify::{DiscordWebhookNotifier, LogNotifier, Notifier};
use orchestrator::persistence::{JsonlDailyLog, JsonlSessionLog};
use orchestrator::{Services, SystemClock};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve the effective configuration: file or environment, then the
/// command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        None => Config::new()?,
    };
    if let Some(username) = &cli.username {
        config.username.clone_from(username);
    }
    let config = config.normalized();
    if config.username.is_empty() {
        return Err(Error::MissingUsername.into());
    }
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Production collaborators for `config`.
pub async fn services(config: &Config, dry_run: bool) -> Result<Services, Error> {
    let source = ProfileOracle::new(config.username.clone(), config.intervals.fetch_timeout)?;
    let notifier: Arc<dyn Notifier> = if dry_run {
        info!("dry run; notifications are logged only");
        Arc::new(LogNotifier::default())
    } else {
        Arc::new(DiscordWebhookNotifier::new(config)?)
    };

    Ok(Services {
        source: Arc::new(source),
        notifier,
        daily_log: Arc::new(JsonlDailyLog::new(config.persistence.daily_dir()).await?),
        session_log: Arc::new(JsonlSessionLog::new(config.persistence.streams_dir()).await?),
        clock: Arc::new(SystemClock),
    })
}

/// One fetch, logged at info level.
pub async fn probe(config: &Config) -> Result<(), Error> {
    let oracle = ProfileOracle::new(config.username.clone(), config.intervals.fetch_timeout)?;
    let snapshot = oracle.fetch().await?;
    info!(
        username = oracle.username(),
        live = ?snapshot.live,
        viewers = ?snapshot.viewer_count,
        followers = ?snapshot.followers,
        likes = ?snapshot.likes,
        views = ?snapshot.views,
        latest_video = ?snapshot.latest_video_id,
        title = ?snapshot.live_title,
        "probe"
    );
    Ok(())
}
