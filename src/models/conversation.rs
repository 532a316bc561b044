//! Conversation turns

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Destination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation log. Turns are never modified once
/// appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Search results, only ever attached to assistant turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<Destination>>,
    pub error: bool,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            destinations: None,
            error: false,
            created_at: Utc::now(),
        }
    }

    /// Plain assistant message without results
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            destinations: None,
            error: false,
            created_at: Utc::now(),
        }
    }

    /// Assistant reply to a search, possibly empty and possibly flagged as error
    #[must_use]
    pub fn reply(content: impl Into<String>, destinations: Vec<Destination>, error: bool) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            destinations: Some(destinations),
            error,
            created_at: Utc::now(),
        }
    }

    /// Attached results, empty when there are none
    #[must_use]
    pub fn results(&self) -> &[Destination] {
        self.destinations.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn_has_no_results() {
        let turn = Turn::user("eco-lodges in Italy");
        assert_eq!(turn.role, Role::User);
        assert!(turn.destinations.is_none());
        assert!(turn.results().is_empty());
        assert!(!turn.error);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(Turn::assistant("hi")).unwrap();
        assert_eq!(value["role"], "assistant");
        assert!(value.get("destinations").is_none());

        let value = serde_json::to_value(Turn::reply("none found", Vec::new(), false)).unwrap();
        assert_eq!(value["destinations"], serde_json::json!([]));
    }
}
