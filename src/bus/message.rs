use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Chat message. Immutable once created.
///
/// Ids are UUIDv7, so they sort by creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// True iff `recipient` is set
    pub is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl Message {
    pub fn new(sender: &str, content: &str, recipient: Option<&str>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            is_private: recipient.is_some(),
            recipient: recipient.map(str::to_string),
        }
    }

    /// Whether `identity` is allowed to see this message
    pub fn is_visible_to(&self, identity: &str) -> bool {
        match &self.recipient {
            None => true,
            Some(recipient) => recipient == identity || self.sender == identity,
        }
    }
}
