//! Global configuration types for StudyLife.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! autosave window, the assistant model, the profile store backend, notice
//! lifetime and the emergency contact list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.studylife/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub autosave: AutosaveConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notices: NoticeConfig,

    #[serde(default)]
    pub safety: SafetyConfig,
}

/// Debounce settings for profile autosave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period (ms) a field must stay unchanged before it is saved.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    1500
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Generative text service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
        }
    }
}

/// Which profile store backs the workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Firestore,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Firestore => write!(f, "firestore"),
        }
    }
}

/// Profile store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Required when `backend = "firestore"`.
    #[serde(default)]
    pub firestore_project_id: Option<String>,
}

/// Transient notice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_notice_duration_ms")]
    pub duration_ms: u64,
}

fn default_notice_duration_ms() -> u64 {
    3000
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_notice_duration_ms(),
        }
    }
}

/// Emergency contact shown when SOS mode is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub label: String,
    pub phone: String,
}

/// Safety settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_contacts")]
    pub contacts: Vec<EmergencyContact>,
}

fn default_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact {
            label: "Campus Security".to_string(),
            phone: "+91 999-999-9999".to_string(),
        },
        EmergencyContact {
            label: "Warden".to_string(),
            phone: "+91 888-888-8888".to_string(),
        },
    ]
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            contacts: default_contacts(),
        }
    }
}
