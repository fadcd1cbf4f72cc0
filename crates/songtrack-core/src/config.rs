use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::platform;

/// On-disk configuration as the user writes it. Nothing here is validated;
/// see [`crate::settings::Settings::from_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory that receives one `<station>.txt` per station.
    #[serde(default = "platform::default_output_dir")]
    pub directory: PathBuf,
    /// Poll interval in seconds. Clamped to 1..=60 when the settings are built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval_secs: Option<f64>,
    #[serde(default)]
    pub http: HttpConfig,
    /// Station name → status URL template. The template gets a millisecond
    /// timestamp appended on every request.
    #[serde(default)]
    pub stations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Result of [`Config::load_or_create`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// The file did not exist and defaults were just written to it.
    pub first_start: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("songtrack/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_stations() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "DarkElectro".to_string(),
            "http://79.120.39.202:8000/status.xsl?mount=/darkelectro&_=".to_string(),
        ),
        (
            "SymphoMetal".to_string(),
            "http://79.120.77.11:8000/status.xsl?mount=/symphometal&_=".to_string(),
        ),
    ])
}

impl Config {
    /// Read the config at `path`, or write the defaults there if it is missing.
    pub fn load_or_create(path: &Path) -> anyhow::Result<LoadedConfig> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(LoadedConfig {
                config,
                path: path.to_path_buf(),
                first_start: true,
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            first_start: false,
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: platform::default_output_dir(),
            update_interval_secs: Some(5.0),
            http: HttpConfig::default(),
            stations: default_stations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.update_interval_secs, Some(5.0));
        assert_eq!(config.http.request_timeout_secs, 10);
        assert!(config.http.user_agent.starts_with("songtrack/"));
        assert_eq!(config.stations.len(), 2);
        assert!(config.stations["DarkElectro"].ends_with("&_="));
        assert!(config.directory.ends_with("ObsNowPlaying"));
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let loaded = Config::load_or_create(&path).unwrap();
        assert!(loaded.first_start);
        assert!(path.exists());

        let again = Config::load_or_create(&path).unwrap();
        assert!(!again.first_start);
        assert_eq!(again.config.stations, loaded.config.stations);
        assert_eq!(again.config.update_interval_secs, Some(5.0));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
directory = "/srv/obs"

[stations]
Alpha = "http://x/status?_="
"#,
        )
        .unwrap();

        let config = Config::load_or_create(&path).unwrap().config;
        assert_eq!(config.directory, PathBuf::from("/srv/obs"));
        assert_eq!(config.update_interval_secs, None);
        assert_eq!(config.http.request_timeout_secs, 10);
        assert_eq!(config.stations.len(), 1);
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "stations = 5\n").unwrap();
        assert!(Config::load_or_create(&path).is_err());
    }
}
