use std::{fs, path::PathBuf};

use common::testkit::Config;

pub const APP_NAME: &str = "weft";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Config,
}

impl AppState {
    /// Get the config file path (custom or default ~/.weft/config.toml)
    pub fn config_path(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)).join(CONFIG_FILE_NAME))
    }

    /// Write a new config file
    pub fn init(custom_path: Option<PathBuf>, config: Option<Config>) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path)?;
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(config_path));
        }
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load an existing config file
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path)?;
        if !config_path.exists() {
            return Err(StateError::NotInitialized(config_path));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&config_toml)?;

        Ok(Self {
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine home directory")]
    NoHomeDirectory,
    #[error("config already exists at {0:?}")]
    AlreadyInitialized(PathBuf),
    #[error("no config at {0:?} (run 'weft init' first)")]
    NotInitialized(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("failed to parse config: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);
        let config = Config::default().network_ny_to_sf().blockstore_slow_ssd();

        let state = AppState::init(Some(path.clone()), Some(config)).unwrap();
        assert_eq!(state.config_path, path);

        let loaded = AppState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config, config);

        assert!(matches!(
            AppState::init(Some(path), None),
            Err(StateError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        assert!(matches!(
            AppState::load(Some(path)),
            Err(StateError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "routing_latency_ms = 200\nnetwork_latency_ms = 0.25\n").unwrap();

        let loaded = AppState::load(Some(path)).unwrap();
        assert_eq!(loaded.config.routing_latency, Duration::from_millis(200));
        assert_eq!(loaded.config.network_latency, Duration::from_micros(250));
        assert_eq!(loaded.config.data_amount_bytes, Config::default().data_amount_bytes);
    }

    #[test]
    fn test_bad_latency_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "blockstore_latency_ms = -3.0\n").unwrap();
        assert!(matches!(
            AppState::load(Some(path)),
            Err(StateError::TomlDeserialize(_))
        ));
    }
}
