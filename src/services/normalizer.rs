use crate::schema::{Action, NewEvent};
use crate::services::payload::PayloadView;
use axum::http::HeaderMap;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;

pub const EVENT_HEADER: &str = "x-github-event";

pub const IGNORED_SUB_ACTION: &str = "unhandled pull_request sub-action";
pub const UNSUPPORTED_EVENT: &str = "unsupported event";

const UNKNOWN_AUTHOR: &str = "unknown";

// timestamptz resolution; finer digits would not survive a store round trip
const TIMESTAMP_PRECISION: u16 = 6;

/// An inbound webhook delivery: the sender's kind tag plus its raw body.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: Option<String>,
    pub payload: Value,
}

impl Notification {
    #[cfg(test)]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            payload,
        }
    }

    pub fn from_headers(headers: &HeaderMap, payload: Value) -> Self {
        let kind = headers
            .get(EVENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string());
        Self { kind, payload }
    }
}

/// What to do with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Recognized and mapped; the caller persists the event.
    Stored(NewEvent),
    Ignored(&'static str),
    Rejected(&'static str),
}

/// Classifies a notification and extracts its event fields.
///
/// Pure: `received_at` stands in for any timestamp the payload omits, and
/// nothing is written anywhere.
pub fn normalize(notification: &Notification, received_at: DateTime<Utc>) -> Outcome {
    let payload = PayloadView::new(&notification.payload);
    let received_at = received_at.trunc_subsecs(TIMESTAMP_PRECISION);
    match notification.kind.as_deref() {
        Some("push") => Outcome::Stored(normalize_push(payload, received_at)),
        Some("pull_request") => normalize_pull_request(payload, received_at),
        _ => Outcome::Rejected(UNSUPPORTED_EVENT),
    }
}

fn normalize_push(payload: PayloadView<'_>, received_at: DateTime<Utc>) -> NewEvent {
    let author = payload.get("pusher").get("name").str_or(UNKNOWN_AUTHOR);
    // an absent ref yields an empty branch name; it is stored as-is
    let to_branch = branch_name(payload.get("ref").str_or(""));
    let timestamp = timestamp_or(payload.get("head_commit").get("timestamp"), received_at);

    NewEvent::push(author.to_string(), to_branch.to_string(), timestamp)
}

fn normalize_pull_request(payload: PayloadView<'_>, received_at: DateTime<Utc>) -> Outcome {
    let pr = payload.get("pull_request");
    let sub_action = payload.get("action").str();

    // merge wins over opened if a payload ever claims both
    let action = if sub_action == Some("closed") && pr.get("merged").is_true() {
        Action::Merge
    } else if sub_action == Some("opened") {
        Action::PullRequest
    } else {
        return Outcome::Ignored(IGNORED_SUB_ACTION);
    };

    let author = pr.get("user").get("login").str_or(UNKNOWN_AUTHOR);
    let from_branch = pr.get("head").get("ref").str_or("");
    let to_branch = pr.get("base").get("ref").str_or("");
    let timestamp = timestamp_or(pr.get("created_at"), received_at);

    Outcome::Stored(NewEvent::pull_request(
        action,
        author.to_string(),
        from_branch.to_string(),
        to_branch.to_string(),
        timestamp,
    ))
}

fn branch_name(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}

fn timestamp_or(field: PayloadView<'_>, received_at: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = field.str() else {
        return received_at;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc).trunc_subsecs(TIMESTAMP_PRECISION),
        Err(e) => {
            tracing::warn!(raw, error = %e, "unparseable payload timestamp, using ingestion time");
            received_at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::TimeZone;
    use serde_json::json;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn stored(outcome: Outcome) -> NewEvent {
        match outcome {
            Outcome::Stored(event) => event,
            other => panic!("expected stored event, got {other:?}"),
        }
    }

    #[test]
    fn push_example_maps_to_push_event() {
        let payload = json!({
            "pusher": { "name": "alice" },
            "ref": "refs/heads/main",
            "head_commit": { "timestamp": "2024-01-01T00:00:00Z" }
        });
        let event = stored(normalize(&Notification::new("push", payload), received_at()));

        assert_eq!(
            event,
            NewEvent {
                author: "alice".into(),
                action: Action::Push,
                from_branch: None,
                to_branch: "main".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            }
        );
    }

    #[test]
    fn push_takes_last_ref_segment() {
        for (git_ref, branch) in [
            ("refs/heads/main", "main"),
            ("refs/heads/feature/login", "login"),
            ("refs/tags/v1.0", "v1.0"),
            ("develop", "develop"),
        ] {
            let payload = json!({ "ref": git_ref });
            let event = stored(normalize(&Notification::new("push", payload), received_at()));
            assert_eq!(event.to_branch, branch, "ref {git_ref}");
            assert_eq!(event.action, Action::Push);
            assert_eq!(event.from_branch, None);
        }
    }

    #[test]
    fn push_with_empty_payload_uses_defaults() {
        let event = stored(normalize(&Notification::new("push", json!({})), received_at()));

        assert_eq!(event.author, "unknown");
        assert_eq!(event.to_branch, "");
        assert_eq!(event.from_branch, None);
        assert_eq!(event.timestamp, received_at());
    }

    #[test]
    fn push_with_null_head_commit_uses_ingestion_time() {
        let payload = json!({ "ref": "refs/heads/gone", "head_commit": null });
        let event = stored(normalize(&Notification::new("push", payload), received_at()));
        assert_eq!(event.timestamp, received_at());
    }

    #[test]
    fn push_timestamp_with_offset_is_converted_to_utc() {
        let payload = json!({ "head_commit": { "timestamp": "2024-01-01T05:30:00+05:30" } });
        let event = stored(normalize(&Notification::new("push", payload), received_at()));
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_ingestion_time() {
        let payload = json!({ "head_commit": { "timestamp": "yesterday" } });
        let event = stored(normalize(&Notification::new("push", payload), received_at()));
        assert_eq!(event.timestamp, received_at());
    }

    #[test]
    fn timestamps_are_kept_to_microseconds() {
        let received_at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let micros = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();

        let payload = json!({ "ref": "refs/heads/x", "head_commit": null });
        let event = stored(normalize(&Notification::new("push", payload), received_at));
        assert_eq!(event.timestamp, micros);

        let payload = json!({ "head_commit": { "timestamp": "2023-11-14T22:13:20.123456789Z" } });
        let event = stored(normalize(&Notification::new("push", payload), received_at));
        assert_eq!(event.timestamp, micros);

        let payload = json!({ "action": "opened", "pull_request": {} });
        let event = stored(normalize(
            &Notification::new("pull_request", payload),
            received_at,
        ));
        assert_eq!(event.timestamp, micros);
    }

    #[test]
    fn pull_request_example_maps_to_pull_request_event() {
        let payload = json!({
            "action": "opened",
            "pull_request": {
                "user": { "login": "bob" },
                "head": { "ref": "feature" },
                "base": { "ref": "main" },
                "created_at": "2024-02-01T00:00:00Z"
            }
        });
        let event = stored(normalize(
            &Notification::new("pull_request", payload),
            received_at(),
        ));

        assert_eq!(
            event,
            NewEvent {
                author: "bob".into(),
                action: Action::PullRequest,
                from_branch: Some("feature".into()),
                to_branch: "main".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            }
        );
    }

    #[test]
    fn merged_close_maps_to_merge() {
        let payload = json!({
            "action": "closed",
            "pull_request": {
                "merged": true,
                "user": { "login": "carol" },
                "head": { "ref": "fix" },
                "base": { "ref": "release" }
            }
        });
        let event = stored(normalize(
            &Notification::new("pull_request", payload),
            received_at(),
        ));

        assert_eq!(event.action, Action::Merge);
        assert_eq!(event.author, "carol");
        assert_eq!(event.from_branch.as_deref(), Some("fix"));
        assert_eq!(event.to_branch, "release");
        assert_eq!(event.timestamp, received_at());
    }

    #[test]
    fn merged_close_without_details_still_merges() {
        let payload = json!({ "action": "closed", "pull_request": { "merged": true } });
        let event = stored(normalize(
            &Notification::new("pull_request", payload),
            received_at(),
        ));

        assert_eq!(event.action, Action::Merge);
        assert_eq!(event.author, "unknown");
        assert_eq!(event.from_branch.as_deref(), Some(""));
        assert_eq!(event.to_branch, "");
    }

    #[test]
    fn unmerged_close_is_ignored() {
        let payload = json!({ "action": "closed", "pull_request": { "merged": false } });
        assert_eq!(
            normalize(&Notification::new("pull_request", payload), received_at()),
            Outcome::Ignored(IGNORED_SUB_ACTION)
        );
    }

    #[test]
    fn other_sub_actions_are_ignored() {
        for sub_action in ["synchronize", "reopened", "edited", "labeled"] {
            let payload = json!({ "action": sub_action, "pull_request": { "merged": true } });
            assert_eq!(
                normalize(&Notification::new("pull_request", payload), received_at()),
                Outcome::Ignored(IGNORED_SUB_ACTION),
                "sub-action {sub_action}"
            );
        }
    }

    #[test]
    fn pull_request_without_action_is_ignored() {
        assert_eq!(
            normalize(&Notification::new("pull_request", json!({})), received_at()),
            Outcome::Ignored(IGNORED_SUB_ACTION)
        );
    }

    #[test]
    fn merged_flag_must_be_boolean_true() {
        let payload = json!({ "action": "closed", "pull_request": { "merged": "true" } });
        assert_eq!(
            normalize(&Notification::new("pull_request", payload), received_at()),
            Outcome::Ignored(IGNORED_SUB_ACTION)
        );
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        for kind in ["issues", "", "PUSH", "ping"] {
            assert_eq!(
                normalize(&Notification::new(kind, json!({})), received_at()),
                Outcome::Rejected(UNSUPPORTED_EVENT),
                "kind {kind:?}"
            );
        }
    }

    #[test]
    fn missing_kind_is_rejected() {
        let notification = Notification::from_headers(&HeaderMap::new(), json!({}));
        assert_eq!(notification.kind, None);
        assert_eq!(
            normalize(&notification, received_at()),
            Outcome::Rejected(UNSUPPORTED_EVENT)
        );
    }

    #[test]
    fn kind_is_read_from_event_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-GitHub-Event", HeaderValue::from_static("push"));
        let notification = Notification::from_headers(&headers, json!({}));
        assert_eq!(notification.kind.as_deref(), Some("push"));
    }
}
