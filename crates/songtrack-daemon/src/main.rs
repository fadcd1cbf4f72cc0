mod cli;
mod logging;
mod shutdown;

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use songtrack_core::config::Config;
use songtrack_core::{platform, ConfigError, HttpFetcher, Settings, UpdateOrchestrator};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let interactive = !cli.service && std::io::stdin().is_terminal();

    let log_path = platform::log_path();
    if let Err(e) = logging::init(&log_path) {
        eprintln!("songtrack: cannot open log file {}: {:#}", log_path.display(), e);
        return ExitCode::FAILURE;
    }

    let stop = CancellationToken::new();
    shutdown::spawn_triggers(stop.clone(), interactive);

    match run(cli, interactive, stop.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(config_err) = e.downcast_ref::<ConfigError>() {
                error!("{}", config_err);
            } else {
                error!("{:#}", e);
                error!("Unexpected error. Application will be closed.");
            }
            if interactive {
                info!("Press Enter to exit.");
                stop.cancelled().await;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, interactive: bool, stop: CancellationToken) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    let loaded = Config::load_or_create(&config_path).with_context(|| {
        format!(
            "Unable to read program settings from {}",
            config_path.display()
        )
    })?;
    if loaded.first_start {
        return Err(ConfigError::FirstStart(loaded.path).into());
    }
    info!("Config loaded from {}", loaded.path.display());

    let settings = Settings::from_config(&loaded.config, &loaded.path)?;
    let fetcher = HttpFetcher::new(settings.request_timeout, &settings.user_agent)
        .context("cannot build HTTP client")?;

    if interactive {
        info!("Press Enter to stop.");
    }
    UpdateOrchestrator::new(&settings, fetcher).run(stop).await?;
    info!("Stopped.");
    Ok(())
}
