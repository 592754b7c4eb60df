//! Toast-style notifications.
//!
//! Every user-triggered action reports its outcome here. Entries are also
//! forwarded to the log so a headless run keeps the same trail.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded history of notifications, oldest first
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Success | NotificationLevel::Info => info!("🔔 {}", message),
            NotificationLevel::Warning => warn!("🔔 {}", message),
            NotificationLevel::Error => error!("🔔 {}", message),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Notification {
            level,
            message,
            created_at: Utc::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return everything, e.g. after a UI shell has displayed it
    pub fn drain(&mut self) -> Vec<Notification> {
        self.entries.drain(..).collect()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(50)
    }
}
