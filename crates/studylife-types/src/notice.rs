//! Transient user-visible notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A notice shown to the user for a fixed lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub level: NoticeLevel,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(
        message: impl Into<String>,
        level: NoticeLevel,
        now: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            message: message.into(),
            level,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expiry() {
        let now = Utc::now();
        let notice = Notice::new(
            "Profile saved",
            NoticeLevel::Success,
            now,
            chrono::Duration::milliseconds(3000),
        );
        assert!(notice.is_active(now));
        assert!(notice.is_active(now + chrono::Duration::milliseconds(2999)));
        assert!(!notice.is_active(now + chrono::Duration::milliseconds(3000)));
    }

    #[test]
    fn test_notice_level_serde() {
        let json = serde_json::to_string(&NoticeLevel::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
