use clap::Parser;
use orchestrator::{ControlEvent, Orchestrator};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokwatch::{
    app,
    cli::Cli,
    logging,
    signals::{SignalEvent, wait_for_signal},
};
use tracing::{debug, error, info};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbosity.tracing_level_filter(), cli.logfile())?;

    debug!(config = ?cli);

    let config = app::load_config(&cli)?;

    if cli.probe {
        app::probe(&config).await?;
        return Ok(());
    }

    let services = app::services(&config, cli.dry_run).await?;
    let cancel = CancellationToken::new();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = flume::bounded(8);

    let mut orchestrator = Orchestrator::new(config, services);
    let run = orchestrator.run_until(cancel.clone(), control_rx);
    let signals = wait_for_signal(&events_tx);
    tokio::pin!(run, signals);

    loop {
        tokio::select! {
            _ = &mut run => break,
            res = &mut signals => {
                error!(error = ?res, "Error while waiting for signal");
                cancel.cancel();
                res?;
                break;
            }
            res = events_rx.recv_async() => {
                let event = res?;
                debug!(?event, "Received signal event");
                match event {
                    SignalEvent::Shutdown => {
                        info!("shutting down");
                        cancel.cancel();
                    }
                    SignalEvent::DumpStatus => {
                        if control_tx.send(ControlEvent::DumpStatus).is_err() {
                            debug!("orchestrator no longer listening");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
