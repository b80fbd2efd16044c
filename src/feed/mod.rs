//! Notification feed: the records ScrumFlow produces and the source we poll them from.
//!
//! The backend owns every record. This crate only reads snapshots of the feed and
//! never mutates them.

pub mod http;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single notification as returned by the ScrumFlow API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Stable unique identifier. Used as the dedup key and the alert tag.
    pub id: String,
    /// Category tag, e.g. "task_assigned", "project_invite", "reminder".
    #[serde(rename = "type")]
    pub category: String,
    pub title: String,
    #[serde(alias = "body")]
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<NotificationMetadata>,
}

impl NotificationRecord {
    /// The project this notification points at, if any.
    pub fn project_id(&self) -> Option<&str> {
        self.metadata.as_ref()?.project_id.as_deref()
    }
}

/// Structured metadata attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMetadata {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Keys we don't interpret (taskId, reminderId, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One snapshot of the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub notifications: Vec<NotificationRecord>,
    #[serde(default)]
    pub unread_count: Option<usize>,
}

impl NotificationFeed {
    pub fn new(notifications: Vec<NotificationRecord>) -> Self {
        Self {
            notifications,
            unread_count: None,
        }
    }

    /// Unread count reported by the backend, or counted from the records.
    pub fn unread(&self) -> usize {
        self.unread_count
            .unwrap_or_else(|| self.notifications.iter().filter(|n| !n.read).count())
    }
}

/// Anything that can return the current notification feed for the signed-in user.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<NotificationFeed>> + Send;
}
