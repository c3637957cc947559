use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single notification as returned by the notification service.
///
/// The notification endpoints use snake_case field names, unlike the auth
/// and wallet services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The unique identifier for the notification.
    pub notification_id: Uuid,
    /// The account the notification belongs to.
    pub account_id: Uuid,
    /// Whether the notification has been read.
    pub is_read: bool,
    /// Whether the notification was dismissed.
    pub was_dismissed: bool,
    /// Short label shown in the notification list.
    pub label: String,
    /// Notification body text.
    pub content: String,
    /// When the notification was raised.
    pub date: DateTime<Utc>,
    /// Optional notification type tag.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Optional icon hint.
    #[serde(default)]
    pub icon: Option<String>,
    /// Priority, e.g. "low", "normal", "high".
    pub priority: String,
    /// Category, e.g. "security" or "transactions".
    pub category: String,
    /// Optional URL the notification links to.
    #[serde(default)]
    pub action_url: Option<String>,
}

/// One page of notifications plus the unread counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPage {
    /// The notifications on this page.
    pub notifications: Vec<Notification>,
    /// Total notifications for the account.
    pub total: u64,
    /// The page number that was returned (1-based).
    pub page: u32,
    /// The page size that was used.
    pub page_size: u32,
    /// Number of unread notifications across all pages.
    pub unread_count: u64,
}
