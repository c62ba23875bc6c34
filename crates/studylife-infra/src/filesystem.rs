//! Data directory layout and the persisted sign-in.
//!
//! Everything StudyLife writes locally lives under one data directory:
//! `config.toml`, the SQLite database and `session.json`, which remembers
//! the signed-in identity between CLI invocations. Only the identity is
//! stored; no provider tokens are written to disk.

use std::path::{Path, PathBuf};

use studylife_types::identity::AuthIdentity;

/// Resolve the data directory.
///
/// Order: `STUDYLIFE_DATA_DIR`, then `~/.studylife`, then `./.studylife`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STUDYLIFE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".studylife");
    }

    PathBuf::from(".studylife")
}

/// SQLite URL for the profile database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("studylife.db").display())
}

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

/// Read the remembered identity. A missing or unreadable file means
/// signed out.
pub async fn load_session(data_dir: &Path) -> Option<AuthIdentity> {
    let path = session_path(data_dir);
    let content = tokio::fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(identity) => Some(identity),
        Err(err) => {
            tracing::warn!("Ignoring unreadable session file {}: {err}", path.display());
            None
        }
    }
}

pub async fn save_session(data_dir: &Path, identity: &AuthIdentity) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;
    let json = serde_json::to_string_pretty(identity)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(session_path(data_dir), json).await
}

/// Forget the remembered identity. No-op when signed out.
pub async fn clear_session(data_dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(session_path(data_dir)).await {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> AuthIdentity {
        AuthIdentity {
            id: "uid-9".into(),
            display_name: Some("Grace".into()),
            email: Some("grace@uni.edu".into()),
        }
    }

    #[test]
    fn database_url_points_into_data_dir() {
        let url = database_url(Path::new("/tmp/sl"));
        assert!(url.starts_with("sqlite:///tmp/sl/studylife.db"));
    }

    #[tokio::test]
    async fn session_roundtrip_and_clear() {
        let tmp = TempDir::new().unwrap();
        assert!(load_session(tmp.path()).await.is_none());

        save_session(tmp.path(), &identity()).await.unwrap();
        assert_eq!(load_session(tmp.path()).await, Some(identity()));

        clear_session(tmp.path()).await.unwrap();
        assert!(load_session(tmp.path()).await.is_none());
        clear_session(tmp.path()).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_session_reads_as_signed_out() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(session_path(tmp.path()), "{not json").await.unwrap();
        assert!(load_session(tmp.path()).await.is_none());
    }
}
