//! `config.toml` loading.
//!
//! The file lives in the data directory (`~/.studylife/` unless
//! `STUDYLIFE_DATA_DIR` says otherwise). A missing or broken file never stops
//! the app; it runs on [`GlobalConfig::default()`] instead.

use std::io::ErrorKind;
use std::path::Path;

use studylife_types::config::{GlobalConfig, StorageBackend};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "config.toml";

/// Read, parse and sanitize `{data_dir}/config.toml`.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let path = data_dir.join(CONFIG_FILE);

    let parsed = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => toml::from_str::<GlobalConfig>(&raw)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "Ignoring malformed config")),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            return GlobalConfig::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
            return GlobalConfig::default();
        }
    };

    parsed.map(validate).unwrap_or_default()
}

/// Lowest accepted debounce window.
const MIN_DEBOUNCE_MS: u64 = 100;

fn validate(mut config: GlobalConfig) -> GlobalConfig {
    if config.autosave.debounce_ms < MIN_DEBOUNCE_MS {
        warn!(
            debounce_ms = config.autosave.debounce_ms,
            "autosave.debounce_ms below {MIN_DEBOUNCE_MS}, clamping"
        );
        config.autosave.debounce_ms = MIN_DEBOUNCE_MS;
    }
    if config.storage.backend == StorageBackend::Firestore
        && config.storage.firestore_project_id.is_none()
    {
        warn!("storage.backend = \"firestore\" without firestore_project_id, using sqlite");
        config.storage.backend = StorageBackend::Sqlite;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.autosave.debounce_ms, 1500);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[autosave]
debounce_ms = 800

[storage]
backend = "firestore"
firestore_project_id = "studylife-prod"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.autosave.debounce_ms, 800);
        assert_eq!(config.storage.backend, StorageBackend::Firestore);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.autosave.debounce_ms, 1500);
    }

    #[test]
    fn validate_clamps_tiny_debounce() {
        let mut config = GlobalConfig::default();
        config.autosave.debounce_ms = 5;
        assert_eq!(validate(config).autosave.debounce_ms, MIN_DEBOUNCE_MS);
    }

    #[test]
    fn validate_falls_back_when_firestore_project_missing() {
        let mut config = GlobalConfig::default();
        config.storage.backend = StorageBackend::Firestore;
        assert_eq!(validate(config).storage.backend, StorageBackend::Sqlite);
    }
}
