//! Broadcast bus for transient user notices.
//!
//! Built on `tokio::sync::broadcast`, the `NoticeBus` supports multiple
//! concurrent subscribers. It also keeps a small buffer of recent notices so
//! surfaces that poll (the REST server, one-shot CLI commands) can show
//! whatever is still within its display lifetime.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use studylife_types::notice::{Notice, NoticeLevel};
use tokio::sync::broadcast;

/// How many notices the recent buffer keeps.
const RECENT_CAPACITY: usize = 32;

/// Multi-consumer notice bus.
///
/// Cloning the bus clones the sender and shares the recent buffer.
#[derive(Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
    recent: Arc<Mutex<VecDeque<Notice>>>,
    lifetime: chrono::Duration,
}

impl NoticeBus {
    /// Create a bus whose notices stay active for `lifetime_ms`.
    pub fn new(capacity: usize, lifetime_ms: u64) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY))),
            lifetime: chrono::Duration::milliseconds(
                i64::try_from(lifetime_ms).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Create a new subscriber that will receive all future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Publish a notice to all subscribers and the recent buffer.
    pub fn publish(&self, message: impl Into<String>, level: NoticeLevel) -> Notice {
        let notice = Notice::new(message, level, Utc::now(), self.lifetime);
        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(notice.clone());
        }
        let _ = self.sender.send(notice.clone());
        notice
    }

    pub fn info(&self, message: impl Into<String>) -> Notice {
        self.publish(message, NoticeLevel::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> Notice {
        self.publish(message, NoticeLevel::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Notice {
        self.publish(message, NoticeLevel::Error)
    }

    /// Notices still within their lifetime at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.recent
            .lock()
            .map(|recent| {
                recent
                    .iter()
                    .filter(|notice| notice.is_active(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(64, 3000)
    }
}

impl std::fmt::Debug for NoticeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeBus")
            .field("receiver_count", &self.sender.receiver_count())
            .field("lifetime_ms", &self.lifetime.num_milliseconds())
            .finish()
    }
}
