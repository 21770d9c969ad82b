//! Server configuration loaded from environment variables, and the provider
//! that hands out ledger settings snapshots.
//!
//! Process settings have defaults so the server can start with zero
//! configuration for local development. Ledger settings either stay at their
//! defaults or come from a JSON file that is re-read after every edit, so
//! operators can change it without a restart.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use checkin_shared::constants::{DEFAULT_DATA_DIR, DEFAULT_HTTP_PORT, LEGACY_DATA_DIR};
use checkin_shared::{LedgerSettings, SettingsError};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Directory holding the ledger document.
    /// Env: `CHECKIN_DATA_DIR`
    /// Default: `data/plugin-data/checkin`
    pub data_dir: PathBuf,

    /// Directory of a previous deployment's document, copied over once.
    /// Env: `CHECKIN_LEGACY_DIR` (empty disables)
    /// Default: `data/plugins/checkin`
    pub legacy_data_dir: Option<PathBuf>,

    /// Optional JSON settings file.
    /// Env: `CHECKIN_SETTINGS`
    pub settings_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            legacy_data_dir: Some(PathBuf::from(LEGACY_DATA_DIR)),
            settings_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(dir) = lookup("CHECKIN_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("CHECKIN_LEGACY_DIR") {
            config.legacy_data_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }

        if let Some(path) = lookup("CHECKIN_SETTINGS").filter(|p| !p.is_empty()) {
            config.settings_path = Some(PathBuf::from(path));
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    /// Build the settings provider. An invalid settings file fails here.
    pub fn settings_provider(&self) -> Result<Arc<dyn SettingsProvider>, SettingsError> {
        Ok(match &self.settings_path {
            Some(path) => Arc::new(FileSettings::load(path)?),
            None => Arc::new(StaticSettings(LedgerSettings::default())),
        })
    }
}

/// Source of the settings an operation runs under.
pub trait SettingsProvider: Send + Sync {
    fn snapshot(&self) -> LedgerSettings;
}

/// Fixed settings.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub LedgerSettings);

impl SettingsProvider for StaticSettings {
    fn snapshot(&self) -> LedgerSettings {
        self.0.clone()
    }
}

/// Settings re-read from a JSON file whenever it changes.
///
/// A snapshot only stats the file; it is parsed again when its size or
/// modification time differs from the last load. A file that fails to load
/// or validate is logged once and the last valid settings are served instead.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    cached: RwLock<Cached>,
}

#[derive(Debug)]
struct Cached {
    stamp: Option<FileStamp>,
    settings: LedgerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: SystemTime,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            len: meta.len(),
            modified: meta.modified().ok()?,
        })
    }
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let stamp = FileStamp::of(path);
        let settings = LedgerSettings::from_file(path)?;
        tracing::info!(path = %path.display(), "loaded ledger settings");
        Ok(Self {
            path: path.to_path_buf(),
            cached: RwLock::new(Cached { stamp, settings }),
        })
    }
}

impl SettingsProvider for FileSettings {
    fn snapshot(&self) -> LedgerSettings {
        let stamp = FileStamp::of(&self.path);
        {
            let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
            if stamp.is_some() && cached.stamp == stamp {
                return cached.settings.clone();
            }
        }

        let mut cached = self.cached.write().unwrap_or_else(|e| e.into_inner());
        cached.stamp = stamp;
        match LedgerSettings::from_file(&self.path) {
            Ok(fresh) => {
                tracing::info!(path = %self.path.display(), "reloaded ledger settings");
                cached.settings = fresh;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to reload settings, keeping previous"
                );
            }
        }
        cached.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_shared::RoleMode;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.data_dir, PathBuf::from("data/plugin-data/checkin"));
        assert!(config.settings_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("CHECKIN_DATA_DIR", "/var/lib/checkin"),
            ("CHECKIN_LEGACY_DIR", ""),
            ("CHECKIN_SETTINGS", "/etc/checkin.json"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/checkin"));
        assert!(config.legacy_data_dir.is_none());
        assert_eq!(config.settings_path, Some(PathBuf::from("/etc/checkin.json")));
    }

    #[test]
    fn test_invalid_addr_keeps_default() {
        let config = config_from(&[("HTTP_ADDR", "nope")]);
        assert_eq!(config.http_addr, ServerConfig::default().http_addr);
    }

    #[test]
    fn test_file_settings_fail_fast_on_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"reward_ingot_min": 40}"#).unwrap();
        assert!(FileSettings::load(&path).is_err());
    }

    #[test]
    fn test_file_settings_live_reload_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"exchange_roles": "anyone"}"#).unwrap();
        let provider = FileSettings::load(&path).unwrap();
        assert_eq!(provider.snapshot().exchange_roles, RoleMode::Anyone);

        std::fs::write(&path, r#"{"exchange_roles": "admin_only"}"#).unwrap();
        assert_eq!(provider.snapshot().exchange_roles, RoleMode::AdminOnly);

        std::fs::write(&path, r#"{"reward_points_prob": 7}"#).unwrap();
        assert_eq!(provider.snapshot().exchange_roles, RoleMode::AdminOnly);
    }

    #[test]
    fn test_file_settings_unchanged_stamp_skips_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_rank_list_size": 3}"#).unwrap();
        let provider = FileSettings::load(&path).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        // same length, mtime restored
        std::fs::write(&path, r#"{"max_rank_list_size": 7}"#).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        assert_eq!(provider.snapshot().max_rank_list_size, 3);

        std::fs::write(&path, r#"{"max_rank_list_size": 12}"#).unwrap();
        assert_eq!(provider.snapshot().max_rank_list_size, 12);
    }
}
