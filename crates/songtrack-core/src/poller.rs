//! One polling loop per station.
//!
//! Each iteration fetches the station's status page, extracts the current
//! title, writes it to the station's file if it changed, then sleeps for the
//! update interval. The poller exclusively owns its `last_written` title, so
//! debouncing needs no locks.
//!
//! The loop suspends in exactly two places, the fetch and the sleep. Both are
//! raced against the cancellation token; cancellation is the only way out.
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::extract::extract_title;
use crate::fetch::{FetchError, StatusFetcher};
use crate::settings::{StationConfig, UpdateInterval};
use crate::sink::FileSink;

/// Published every time a poller writes a new title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleUpdate {
    pub station: String,
    pub title: String,
    pub at: DateTime<Local>,
}

pub struct StationPoller<F> {
    station: StationConfig,
    fetcher: Arc<F>,
    sink: Arc<FileSink>,
    interval: UpdateInterval,
    updates: broadcast::Sender<TitleUpdate>,
    last_written: String,
}

impl<F: StatusFetcher> StationPoller<F> {
    pub fn new(
        station: StationConfig,
        fetcher: Arc<F>,
        sink: Arc<FileSink>,
        interval: UpdateInterval,
        updates: broadcast::Sender<TitleUpdate>,
    ) -> Self {
        Self {
            station,
            fetcher,
            sink,
            interval,
            updates,
            last_written: String::new(),
        }
    }

    /// Poll until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        debug!("{} polling every {:?}", self.station.name, self.interval.as_duration());

        while !cancel.is_cancelled() {
            let url = self.station.request_url(Utc::now());

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.fetcher.fetch(&url, &cancel) => res,
            };

            match fetched {
                Ok(body) => self.publish(extract_title(&body)).await,
                Err(FetchError::Cancelled) => break,
                Err(e) => error!("{} {}", self.station.name, e),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval.as_duration()) => {}
            }
        }

        info!("{} Task cancelled.", self.station.name);
    }

    async fn publish(&mut self, title: String) {
        if title == self.last_written {
            return;
        }

        // On failure last_written stays put, so the next cycle retries.
        if let Err(e) = self.sink.write(&self.station.name, &title).await {
            error!("{} {}", self.station.name, e);
            return;
        }

        info!("{} -> {}", self.station.name, title);
        let update = TitleUpdate {
            station: self.station.name.clone(),
            title: title.clone(),
            at: Local::now(),
        };
        self.last_written = title;
        // No subscribers is fine
        let _ = self.updates.send(update);
    }
}
