//! Short, transient user-visible notices.
//!
//! The only notice the core emits is "no store could be opened" after an
//! accepted prompt, but hosts route it through the same [`NoticeSink`] they
//! use for their own toasts or status lines.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const NOTICE_PREFIX: &str = "App Rater";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

fn default_title(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "Info",
        NoticeLevel::Warning => "Warning",
        NoticeLevel::Error => "Error",
    }
}

impl Notice {
    /// Build a notice. A missing or blank title falls back to the level's
    /// default; either way it is prefixed with the product name.
    pub fn new(level: NoticeLevel, title: Option<&str>, body: impl Into<String>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title(level));
        Self {
            level,
            title: format!("{NOTICE_PREFIX} · {title}"),
            body: body.into(),
        }
    }
}

/// Receives notices for display.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to the `tracing` log.
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info => info!(title = %notice.title, "{}", notice.body),
            NoticeLevel::Warning | NoticeLevel::Error => {
                warn!(title = %notice.title, "{}", notice.body)
            }
        }
    }
}

/// Collects notices for a frontend to drain at its own pace.
///
/// Clones share the same buffer: hand one clone to the navigator and keep
/// another in the UI.
#[derive(Clone, Default)]
pub struct NoticeBuffer(Arc<Mutex<Vec<Notice>>>);

impl NoticeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all pending notices.
    pub fn drain(&self) -> Vec<Notice> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().map(|b| b.is_empty()).unwrap_or(true)
    }
}

impl NoticeSink for NoticeBuffer {
    fn notify(&self, notice: &Notice) {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        buf.push(notice.clone());
    }
}
