use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A dismissible, non-fatal notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Queue of notices waiting to be shown to the operator.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    next_id: AtomicU64,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let notice = Notice {
            id,
            level,
            message: message.into(),
        };
        // A poisoned board still accepts notices.
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
        id
    }

    /// Currently pending notices, oldest first
    pub fn pending(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Dismiss a notice; returns `false` if it was already gone
    pub fn dismiss(&self, id: u64) -> bool {
        let mut notices = match self.notices.lock() {
            Ok(notices) => notices,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = notices.len();
        notices.retain(|n| n.id != id);
        before != notices.len()
    }

    pub fn clear(&self) {
        match self.notices.lock() {
            Ok(mut notices) => notices.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}
