use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Push,
    PullRequest,
    Merge,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::PullRequest => "PULL_REQUEST",
            Action::Merge => "MERGE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUSH" => Ok(Action::Push),
            "PULL_REQUEST" => Ok(Action::PullRequest),
            "MERGE" => Ok(Action::Merge),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// A normalized notification that has not been stored yet.
///
/// `from_branch` is `None` exactly when `action` is [`Action::Push`]; the
/// constructors are the only way the normalizer builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub author: String,
    pub action: Action,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: DateTime<Utc>,
}

impl NewEvent {
    pub fn push(author: String, to_branch: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            author,
            action: Action::Push,
            from_branch: None,
            to_branch,
            timestamp,
        }
    }

    pub fn pull_request(
        action: Action,
        author: String,
        from_branch: String,
        to_branch: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        debug_assert!(action != Action::Push, "pull request events carry a source branch");
        Self {
            author,
            action,
            from_branch: Some(from_branch),
            to_branch,
            timestamp,
        }
    }

    pub fn into_event(self, id: Uuid) -> Event {
        Event {
            id,
            author: self.author,
            action: self.action,
            from_branch: self.from_branch,
            to_branch: self.to_branch,
            timestamp: self.timestamp,
        }
    }
}

/// A stored event as served by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub author: String,
    pub action: Action,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    #[cfg(test)]
    pub fn record(&self) -> NewEvent {
        NewEvent {
            author: self.author.clone(),
            action: self.action,
            from_branch: self.from_branch.clone(),
            to_branch: self.to_branch.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Row shape of the `events` table; `action` is stored as text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub author: String,
    pub action: String,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = UnknownAction;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: row.id,
            author: row.author,
            action: row.action.parse()?,
            from_branch: row.from_branch,
            to_branch: row.to_branch,
            timestamp: row.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_feed_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let id = Uuid::new_v4();
        let event = NewEvent::push("alice".into(), "main".into(), ts).into_event(id);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["author"], "alice");
        assert_eq!(json["action"], "PUSH");
        assert!(json["from_branch"].is_null());
        assert_eq!(json["to_branch"], "main");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn action_text_matches_serde_names() {
        for action in [Action::Push, Action::PullRequest, Action::Merge] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, action.as_str());
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("CLOSED".parse::<Action>().is_err());
    }

    #[test]
    fn row_with_unknown_action_is_rejected() {
        let row = EventRow {
            id: Uuid::new_v4(),
            author: "alice".into(),
            action: "DELETE".into(),
            from_branch: None,
            to_branch: "main".into(),
            timestamp: Utc::now(),
        };
        let err = Event::try_from(row).unwrap_err();
        assert_eq!(err, UnknownAction("DELETE".into()));
        assert_eq!(err.to_string(), r#"unknown action "DELETE""#);
    }
}
