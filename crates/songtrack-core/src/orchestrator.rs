//! Lifecycle owner for every station poller.
//!
//! `start` spawns one task per station, each holding a child of the caller's
//! stop token. `stop` cancels them, joins every task, and only then clears the
//! output directory, so clearing never races a poller's write.
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::fetch::StatusFetcher;
use crate::poller::{StationPoller, TitleUpdate};
use crate::settings::{Settings, StationConfig, UpdateInterval};
use crate::sink::FileSink;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

pub struct UpdateOrchestrator<F> {
    stations: Vec<StationConfig>,
    interval: UpdateInterval,
    sink: Arc<FileSink>,
    fetcher: Arc<F>,
    updates: broadcast::Sender<TitleUpdate>,
    pollers: JoinSet<()>,
    /// Parent of every poller token; `Some` once started.
    cancel: Option<CancellationToken>,
}

impl<F: StatusFetcher> UpdateOrchestrator<F> {
    pub fn new(settings: &Settings, fetcher: F) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            stations: settings.stations.clone(),
            interval: settings.interval,
            sink: Arc::new(FileSink::new(settings.directory.clone())),
            fetcher: Arc::new(fetcher),
            updates,
            pollers: JoinSet::new(),
            cancel: None,
        }
    }

    pub fn sink(&self) -> &FileSink {
        &self.sink
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TitleUpdate> {
        self.updates.subscribe()
    }

    /// Number of poller tasks that have not been joined yet.
    pub fn running(&self) -> usize {
        self.pollers.len()
    }

    /// Create the output directory and spawn every poller.
    pub async fn start(&mut self, stop: &CancellationToken) -> anyhow::Result<()> {
        if self.cancel.is_some() {
            anyhow::bail!("update orchestrator already started");
        }

        self.sink
            .ensure_directory()
            .await
            .context("cannot prepare output directory")?;

        let cancel = stop.child_token();
        for station in &self.stations {
            let poller = StationPoller::new(
                station.clone(),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.sink),
                self.interval,
                self.updates.clone(),
            );
            self.pollers.spawn(poller.run(cancel.child_token()));
        }
        self.cancel = Some(cancel);

        info!(
            "Tracking {} station(s) every {:?}, writing to {}",
            self.stations.len(),
            self.interval.as_duration(),
            self.sink.dir().display()
        );
        Ok(())
    }

    /// Cancel every poller, wait for all of them to exit, then blank every
    /// file in the output directory.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        join_all_pollers(&mut self.pollers).await;

        self.sink
            .clear_all()
            .await
            .context("cannot clear song files")?;
        Ok(())
    }

    /// Start, run until `stop` fires (or every poller has exited on its own),
    /// then shut down through [`Self::stop`].
    ///
    /// Pollers only leave their loop when cancelled, so running out of them
    /// before `stop` fires is an error, reported after the files are cleared.
    pub async fn run(mut self, stop: CancellationToken) -> anyhow::Result<()> {
        self.start(&stop).await?;

        tokio::select! {
            biased;
            _ = stop.cancelled() => {
                info!("Stop requested, shutting down pollers");
            }
            _ = join_all_pollers(&mut self.pollers) => {
                warn!("All pollers exited without a stop request");
            }
        }

        let requested = stop.is_cancelled();
        self.stop().await?;
        if !requested {
            anyhow::bail!("every station poller exited before a stop was requested");
        }
        Ok(())
    }
}

async fn join_all_pollers(pollers: &mut JoinSet<()>) {
    while let Some(joined) = pollers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                error!("Station poller panicked: {}", e);
            }
        }
    }
}
