//! Normalization of inbound webhook bodies into comment-event candidates.
//!
//! Notion has shipped several incompatible payload shapes over time (an
//! `events` array, a single inlined `event`, or bare `type`/`data` fields on
//! the envelope). This module absorbs that variance at one seam so the
//! rewrite pipeline never has to inspect raw payload shapes. It never errors;
//! a body nothing can be extracted from yields an empty candidate list.

use serde_json::{json, Value};

/// One processable lead extracted from a webhook body: either a typed
/// comment event object, or a bare comment id discovered heuristically when
/// no typed event matched.
#[derive(Debug, Clone)]
pub enum CommentCandidate {
    Event(Value),
    FallbackId(String),
}

/// Extract the ordered list of comment candidates from a webhook body.
pub fn collect_comment_candidates(body: &Value) -> Vec<CommentCandidate> {
    let envelope = match body.get("payload") {
        Some(payload) if !payload.is_null() => payload,
        _ => body,
    };
    if !envelope.is_object() {
        return Vec::new();
    }

    let mut events: Vec<Value> = if let Some(array) = envelope.get("events").and_then(Value::as_array)
    {
        array.clone()
    } else if let Some(event) = envelope.get("event").filter(|value| !value.is_null()) {
        vec![event.clone()]
    } else {
        Vec::new()
    };

    // Some payloads carry a single event as bare type+data fields.
    if events.is_empty() {
        if let (Some(kind), Some(data)) = (
            envelope.get("type").and_then(Value::as_str),
            envelope.get("data").filter(|value| !value.is_null()),
        ) {
            events = vec![json!({ "type": kind, "data": data })];
        }
    }

    let typed: Vec<CommentCandidate> = events
        .into_iter()
        .filter(|event| event.is_object())
        .filter(|event| {
            event
                .get("type")
                .and_then(Value::as_str)
                .map(|kind| kind.to_lowercase().contains("comment"))
                .unwrap_or(false)
        })
        .map(CommentCandidate::Event)
        .collect();

    if !typed.is_empty() {
        return typed;
    }

    extract_candidate_comment_ids(body)
        .into_iter()
        .map(CommentCandidate::FallbackId)
        .collect()
}

/// Scan the fixed set of known nested locations for comment ids, dedupe,
/// preserve discovery order.
pub fn extract_candidate_comment_ids(body: &Value) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();

    push_id(&mut ids, string_at(Some(body), &["payload", "data", "comment", "id"]));
    push_id(&mut ids, string_at(Some(body), &["payload", "data", "id"]));
    push_id(&mut ids, string_at(Some(body), &["data", "comment", "id"]));
    push_id(&mut ids, string_at(Some(body), &["data", "id"]));

    let raw_events: Vec<&Value> = if let Some(array) =
        value_at(body, &["payload", "events"]).and_then(Value::as_array)
    {
        array.iter().collect()
    } else if let Some(array) = body.get("events").and_then(Value::as_array) {
        array.iter().collect()
    } else if let Some(event) = body.get("event").filter(|value| !value.is_null()) {
        vec![event]
    } else {
        Vec::new()
    };

    for event in raw_events {
        push_id(&mut ids, string_at(Some(event), &["data", "comment", "id"]));
        push_id(&mut ids, string_at(Some(event), &["data", "id"]));
    }

    ids
}

fn push_id(ids: &mut Vec<String>, value: Option<String>) {
    if let Some(id) = value {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

pub(crate) fn value_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

pub(crate) fn string_at(value: Option<&Value>, path: &[&str]) -> Option<String> {
    value
        .and_then(|root| value_at(root, path))
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_comment_events_are_kept_in_order() {
        let body = json!({
            "payload": {
                "events": [
                    { "type": "comment.created", "data": { "id": "c1" } },
                    { "type": "page.updated", "data": { "id": "p1" } },
                    { "type": "comment", "data": { "id": "c2" } },
                ]
            }
        });

        let candidates = collect_comment_candidates(&body);
        assert_eq!(candidates.len(), 2);
        let ids: Vec<_> = candidates
            .iter()
            .map(|candidate| match candidate {
                CommentCandidate::Event(event) => {
                    event["data"]["id"].as_str().unwrap().to_string()
                }
                CommentCandidate::FallbackId(id) => id.clone(),
            })
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn single_inlined_event_is_accepted() {
        let body = json!({ "event": { "type": "comment.created", "data": { "id": "c9" } } });
        let candidates = collect_comment_candidates(&body);
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0], CommentCandidate::Event(_)));
    }

    #[test]
    fn bare_type_and_data_synthesize_an_event() {
        let body = json!({ "type": "comment.created", "data": { "comment": { "id": "c3" } } });
        let candidates = collect_comment_candidates(&body);
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0], CommentCandidate::Event(_)));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let body = json!({
            "payload": {
                "events": [null, 42, "comment", { "data": {} }, { "type": 7 }]
            }
        });
        assert!(collect_comment_candidates(&body).is_empty());
    }

    #[test]
    fn non_object_body_yields_nothing() {
        assert!(collect_comment_candidates(&json!("nope")).is_empty());
        assert!(collect_comment_candidates(&json!(null)).is_empty());
    }

    #[test]
    fn fallback_extracts_nested_comment_id() {
        let body = json!({ "payload": { "data": { "comment": { "id": "abc" } } } });
        let candidates = collect_comment_candidates(&body);
        assert_eq!(candidates.len(), 1);
        match &candidates[0] {
            CommentCandidate::FallbackId(id) => assert_eq!(id, "abc"),
            other => panic!("expected fallback id, got {other:?}"),
        }
    }

    #[test]
    fn candidate_ids_are_deduplicated_in_discovery_order() {
        let body = json!({
            "payload": { "data": { "comment": { "id": "a" }, "id": "b" } },
            "data": { "id": "a" },
            "events": [
                { "data": { "comment": { "id": "c" } } },
                { "data": { "id": "b" } },
            ]
        });
        assert_eq!(extract_candidate_comment_ids(&body), vec!["a", "b", "c"]);
    }
}
