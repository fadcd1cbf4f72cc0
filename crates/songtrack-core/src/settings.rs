//! Validated, in-memory settings consumed by the polling engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("First launch detected. Verify settings at {} and restart the program.", .0.display())]
    FirstStart(PathBuf),
    #[error("Invalid {property}, check {}: {reason}", .path.display())]
    Invalid {
        property: &'static str,
        reason: String,
        path: PathBuf,
    },
}

/// One station to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub name: String,
    pub url_template: String,
}

impl StationConfig {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// Template plus the Unix time in milliseconds, so caches never answer.
    pub fn request_url(&self, now: DateTime<Utc>) -> String {
        format!("{}{}", self.url_template, now.timestamp_millis())
    }
}

/// Poll cadence shared by every station, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateInterval(Duration);

impl UpdateInterval {
    pub const MIN: Duration = Duration::from_secs(1);
    pub const MAX: Duration = Duration::from_secs(60);

    pub fn from_secs(secs: Option<f64>) -> Self {
        let secs = secs
            .filter(|s| s.is_finite())
            .unwrap_or(Self::MIN.as_secs_f64())
            .clamp(Self::MIN.as_secs_f64(), Self::MAX.as_secs_f64());
        Self(Duration::from_secs_f64(secs))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub stations: Vec<StationConfig>,
    pub interval: UpdateInterval,
    pub directory: PathBuf,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Settings {
    /// Validate `config`, which was read from `path` (used in messages only).
    pub fn from_config(config: &Config, path: &Path) -> Result<Self, ConfigError> {
        let invalid = |property: &'static str, reason: String| ConfigError::Invalid {
            property,
            reason,
            path: path.to_path_buf(),
        };

        if config.directory.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(invalid("directory", "must not be empty".to_string()));
        }
        if config.stations.is_empty() {
            return Err(invalid("stations", "no stations configured".to_string()));
        }

        let mut stations = Vec::with_capacity(config.stations.len());
        for (name, template) in &config.stations {
            validate_station_name(name).map_err(|reason| invalid("stations", reason))?;
            validate_url_template(name, template).map_err(|reason| invalid("stations", reason))?;
            stations.push(StationConfig::new(name.clone(), template.clone()));
        }

        Ok(Self {
            stations,
            interval: UpdateInterval::from_secs(config.update_interval_secs),
            directory: config.directory.clone(),
            request_timeout: Duration::from_secs(config.http.request_timeout_secs.max(1)),
            user_agent: config.http.user_agent.clone(),
        })
    }
}

// The name becomes a file stem inside the output directory.
fn validate_station_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("station name must not be empty".to_string());
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) || name.contains('\0') {
        return Err(format!("station name {:?} is not a valid file name", name));
    }
    Ok(())
}

fn validate_url_template(name: &str, template: &str) -> Result<(), String> {
    if template.trim().is_empty() {
        return Err(format!("station {:?} has an empty URL", name));
    }
    let url = Url::parse(template)
        .map_err(|e| format!("station {:?} has an invalid URL {:?}: {}", name, template, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "station {:?} URL must be http or https, got {:?}",
            name,
            url.scheme()
        ));
    }
    Ok(())
}
