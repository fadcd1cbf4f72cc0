#![allow(dead_code)]

use reqwest::StatusCode;
use songtrack_core::{FetchError, Settings, StationConfig, StatusFetcher, UpdateInterval};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Icecast-style mount page with a `Current Song:` row.
pub fn status_page(title: &str) -> String {
    format!(
        "<html><body><table>\n\
         <tr><td>Stream Title:</td><td class=\"streamdata\">Test Mount</td></tr>\n\
         <tr><td>Current Song:</td><td class=\"streamdata\">{}</td></tr>\n\
         </table></body></html>",
        title
    )
}

/// Mount page without a current song row.
pub fn status_page_without_song() -> String {
    "<html><body><table>\n\
     <tr><td>Stream Title:</td><td class=\"streamdata\">Test Mount</td></tr>\n\
     </table></body></html>"
        .to_string()
}

pub fn settings(dir: &Path, interval_secs: Option<f64>, stations: &[(&str, &str)]) -> Settings {
    Settings {
        stations: stations
            .iter()
            .map(|(name, url)| StationConfig::new(*name, *url))
            .collect(),
        interval: UpdateInterval::from_secs(interval_secs),
        directory: dir.to_path_buf(),
        request_timeout: Duration::from_secs(5),
        user_agent: "songtrack-test".to_string(),
    }
}

/// Serves a fixed body per URL template and counts requests.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, template: &str, body: String) -> Self {
        self.pages.insert(template.to_string(), body);
        self
    }

    pub fn calls(&self, template: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(template)
            .copied()
            .unwrap_or(0)
    }
}

impl StatusFetcher for StubFetcher {
    async fn fetch(&self, url: &str, _cancel: &CancellationToken) -> Result<String, FetchError> {
        let Some((template, body)) = self.pages.iter().find(|(t, _)| url.starts_with(t.as_str()))
        else {
            return Err(FetchError::Status(StatusCode::NOT_FOUND));
        };
        *self.calls.lock().unwrap().entry(template.clone()).or_default() += 1;
        Ok(body.clone())
    }
}

/// Never answers and ignores the token, like a server that stalls mid-response.
pub struct StalledFetcher;

impl StatusFetcher for StalledFetcher {
    async fn fetch(&self, _url: &str, _cancel: &CancellationToken) -> Result<String, FetchError> {
        std::future::pending().await
    }
}

/// Lets a test keep a handle on a fetcher the orchestrator owns.
pub struct SharedFetcher<F>(pub Arc<F>);

impl<F: StatusFetcher> StatusFetcher for SharedFetcher<F> {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, FetchError> {
        self.0.fetch(url, cancel).await
    }
}
