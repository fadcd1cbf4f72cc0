//! Now-playing tracker core: polls Icecast status pages and keeps one text
//! file per station in sync with the currently playing title.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod orchestrator;
pub mod platform;
pub mod poller;
pub mod settings;
pub mod sink;

pub use extract::extract_title;
pub use fetch::{FetchError, HttpFetcher, StatusFetcher};
pub use orchestrator::UpdateOrchestrator;
pub use poller::{StationPoller, TitleUpdate};
pub use settings::{ConfigError, Settings, StationConfig, UpdateInterval};
pub use sink::{FileSink, SinkError};
