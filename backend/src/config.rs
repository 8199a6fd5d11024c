//! # Configuration
//!
//! Application configuration, resolved in three layers:
//!
//! 1. Built-in defaults (documents directory, `127.0.0.1:3000`)
//! 2. Optional YAML file named by `ESCAPE_ROOM_CONFIG`
//! 3. Environment overrides (`ESCAPE_ROOM_DOCUMENTS_DIR`, `ESCAPE_ROOM_BIND_ADDR`,
//!    `ESCAPE_ROOM_FRONTEND_ORIGIN`)
//!
//! ## YAML Format
//!
//! ```yaml
//! documents_dir: "/home/me/Documents"
//! bind_address: "127.0.0.1:3000"
//! frontend_origin: "http://localhost:8080"
//! ```

use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_ENV: &str = "ESCAPE_ROOM_CONFIG";
pub const DOCUMENTS_DIR_ENV: &str = "ESCAPE_ROOM_DOCUMENTS_DIR";
pub const BIND_ADDR_ENV: &str = "ESCAPE_ROOM_BIND_ADDR";
pub const FRONTEND_ORIGIN_ENV: &str = "ESCAPE_ROOM_FRONTEND_ORIGIN";

/// Directory under the documents root that holds all app data
pub const APP_DIRECTORY: &str = "escape-room-tracker";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine documents directory")]
    NoDocumentsDirectory,
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root that stands in for the device's Documents directory
    pub documents_dir: PathBuf,
    pub bind_address: SocketAddr,
    /// Origin allowed by CORS
    pub frontend_origin: String,
}

/// Shape of the optional YAML config file; every key may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    documents_dir: Option<PathBuf>,
    bind_address: Option<String>,
    frontend_origin: Option<String>,
}

impl AppConfig {
    /// Config rooted at an explicit directory, everything else default
    pub fn with_documents_dir<P: AsRef<Path>>(documents_dir: P) -> Self {
        Self {
            documents_dir: documents_dir.as_ref().to_path_buf(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            frontend_origin: "http://localhost:8080".to_string(),
        }
    }

    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup(CONFIG_FILE_ENV) {
            Some(path) => read_config_file(Path::new(&path))?,
            None => {
                debug!("{} not set, skipping config file", CONFIG_FILE_ENV);
                ConfigFile::default()
            }
        };

        let documents_dir = lookup(DOCUMENTS_DIR_ENV)
            .map(PathBuf::from)
            .or(file.documents_dir)
            .or_else(default_documents_dir)
            .ok_or(ConfigError::NoDocumentsDirectory)?;
        let mut config = Self::with_documents_dir(documents_dir);

        if let Some(addr) = lookup(BIND_ADDR_ENV).or(file.bind_address) {
            config.bind_address = parse_bind_address(&addr)?;
        }
        if let Some(origin) = lookup(FRONTEND_ORIGIN_ENV).or(file.frontend_origin) {
            config.frontend_origin = origin;
        }

        info!(
            "Configuration loaded: documents_dir={}, bind_address={}",
            config.documents_dir.display(),
            config.bind_address
        );
        Ok(config)
    }

    /// `<documents>/escape-room-tracker`
    pub fn app_directory(&self) -> PathBuf {
        self.documents_dir.join(APP_DIRECTORY)
    }

    /// Where the key-value preferences live
    pub fn preferences_directory(&self) -> PathBuf {
        self.app_directory().join("preferences")
    }
}

fn default_documents_dir() -> Option<PathBuf> {
    if let Some(dir) = dirs::document_dir() {
        return Some(dir);
    }

    warn!("No platform documents directory, falling back to ~/Documents");
    dirs::home_dir().map(|home| home.join("Documents"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bind_address(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidBindAddress(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let vars = HashMap::from([
            (DOCUMENTS_DIR_ENV, "/tmp/escape-docs".to_string()),
            (BIND_ADDR_ENV, "0.0.0.0:4000".to_string()),
        ]);

        let config = AppConfig::load_from(lookup_from(vars)).expect("config should load");
        assert_eq!(config.documents_dir, PathBuf::from("/tmp/escape-docs"));
        assert_eq!(config.bind_address, "0.0.0.0:4000".parse().unwrap());
        assert_eq!(config.frontend_origin, "http://localhost:8080");
        assert_eq!(
            config.preferences_directory(),
            PathBuf::from("/tmp/escape-docs/escape-room-tracker/preferences")
        );
    }

    #[test]
    fn test_yaml_file_then_env() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "documents_dir: /srv/rooms\nbind_address: \"127.0.0.1:5000\"\nfrontend_origin: http://app.local\n",
        )
        .unwrap();

        let vars = HashMap::from([
            (CONFIG_FILE_ENV, config_path.to_string_lossy().to_string()),
            (BIND_ADDR_ENV, "127.0.0.1:6000".to_string()),
        ]);

        let config = AppConfig::load_from(lookup_from(vars)).expect("config should load");
        assert_eq!(config.documents_dir, PathBuf::from("/srv/rooms"));
        assert_eq!(config.bind_address, "127.0.0.1:6000".parse().unwrap());
        assert_eq!(config.frontend_origin, "http://app.local");
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let vars = HashMap::from([
            (DOCUMENTS_DIR_ENV, "/tmp/escape-docs".to_string()),
            (BIND_ADDR_ENV, "not-an-address".to_string()),
        ]);

        let err = AppConfig::load_from(lookup_from(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddress(_)));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let vars = HashMap::from([(CONFIG_FILE_ENV, "/definitely/not/here.yaml".to_string())]);

        let err = AppConfig::load_from(lookup_from(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
