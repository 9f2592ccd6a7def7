//! Record shapes shared by the API client, the services and the stores.
//!
//! Field names follow the backend's JSON (`created_at`, `user_id`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a card.
///
/// Older backend revisions spelled `undone` as `pending`; both are accepted on
/// input, `undone` is always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Done,
    #[default]
    #[serde(alias = "pending")]
    Undone,
    Doing,
}

impl CardStatus {
    /// Get the wire identifier for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Done => "done",
            CardStatus::Undone => "undone",
            CardStatus::Doing => "doing",
        }
    }

    /// Human-readable badge label
    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Done => "Done",
            CardStatus::Undone => "Pending",
            CardStatus::Doing => "Doing",
        }
    }

    /// All statuses, in the order the card form offers them
    pub fn all() -> &'static [CardStatus] {
        &[CardStatus::Undone, CardStatus::Doing, CardStatus::Done]
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "done" => Ok(CardStatus::Done),
            "undone" | "pending" => Ok(CardStatus::Undone),
            "doing" => Ok(CardStatus::Doing),
            _ => Err(format!(
                "Unknown status: {}. Available: undone, doing, done",
                s
            )),
        }
    }
}

/// A persisted card. The id is assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "userId", default)]
    pub user_id: String,
}

impl Card {
    /// Drop the server-assigned fields
    pub fn to_simple(&self) -> SimpleCard {
        SimpleCard {
            title: self.title.clone(),
            content: self.content.clone(),
            status: self.status,
        }
    }
}

/// Card payload without id or timestamps, used for create and generate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleCard {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: CardStatus,
}

impl SimpleCard {
    pub fn new(title: impl Into<String>, content: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            status,
        }
    }

    /// Title and content both carry non-whitespace text
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.status.is_none()
    }

    /// Apply this patch to a local copy of a card
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(content) = &self.content {
            card.content = content.clone();
        }
        if let Some(status) = self.status {
            card.status = status;
        }
    }
}

impl From<SimpleCard> for CardPatch {
    fn from(card: SimpleCard) -> Self {
        Self {
            title: Some(card.title),
            content: Some(card.content),
            status: Some(card.status),
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Envelope wrapping every backend response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// Envelope for a successful response that carried no body
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            message: None,
            data: None,
            error: None,
        }
    }

    /// Best human-readable description the envelope offers
    pub fn describe(&self) -> Option<String> {
        match &self.error {
            Some(serde_json::Value::String(e)) if !e.is_empty() => Some(e.clone()),
            Some(serde_json::Value::Null) | None => self.message.clone(),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_status_labels_are_unique() {
        let labels: HashSet<&str> = CardStatus::all().iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), CardStatus::all().len());
    }

    #[test]
    fn test_pending_is_read_as_undone() {
        let status: CardStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, CardStatus::Undone);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"undone\"");
        assert_eq!("Pending".parse::<CardStatus>().unwrap(), CardStatus::Undone);
    }

    #[test]
    fn test_card_from_backend_json() {
        let json = r#"{
            "id": "8a6e0804-2bd0-4672-b79d-d97027f9071a",
            "title": "Write tests",
            "content": "Cover the workflow",
            "status": "doing",
            "created_at": "2024-01-15T10:00:00Z",
            "updated_at": "2024-01-16T10:00:00Z",
            "user_id": "user-1",
            "user": null
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.status, CardStatus::Doing);
        assert_eq!(card.user_id, "user-1");
        assert!(card.created_at <= card.updated_at);
    }

    #[test]
    fn test_patch_omits_missing_fields() {
        let patch = CardPatch {
            status: Some(CardStatus::Done),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"status":"done"}"#);
    }

    #[test]
    fn test_envelope_without_data() {
        let resp: ApiResponse<Vec<Card>> =
            serde_json::from_str(r#"{"status":500,"message":"Failed to list cards","error":"db down"}"#)
                .unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.describe().as_deref(), Some("db down"));
    }

    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> ApiResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_envelope_decodes_for_any_payload() {
        // Card has no Default; a missing data field must still decode
        let resp: ApiResponse<Card> = decode(r#"{"status":201,"message":"ok"}"#);
        assert!(resp.data.is_none());
        assert_eq!(resp.describe().as_deref(), Some("ok"));
    }
}
