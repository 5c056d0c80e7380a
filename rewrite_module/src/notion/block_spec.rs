//! The model's declarative block descriptions and their conversion to
//! Notion block-create requests.
//!
//! The tagged union rejects unrecognized `type` values at deserialization
//! time, so an unknown kind never reaches the host API. Conversion applies
//! the defensive fixes the host requires: no empty rich text, clamped text
//! lengths, and derived toggle titles.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAX_TEXT_LEN: usize = 2000;
pub const MAX_TOGGLE_TITLE_LEN: usize = 120;
const DEFAULT_TOGGLE_TITLE: &str = "Details";
const DEFAULT_CODE_LANGUAGE: &str = "plain text";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    Paragraph {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        #[serde(default)]
        text: String,
    },
    BulletedListItem {
        #[serde(default)]
        text: String,
        #[serde(default)]
        children: Vec<BlockSpec>,
    },
    NumberedListItem {
        #[serde(default)]
        text: String,
        #[serde(default)]
        children: Vec<BlockSpec>,
    },
    ToDo {
        #[serde(default)]
        text: String,
        #[serde(default)]
        checked: bool,
    },
    Toggle {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        children: Vec<BlockSpec>,
    },
    Quote {
        #[serde(default)]
        text: String,
    },
    Callout {
        #[serde(default)]
        text: String,
        #[serde(default)]
        icon: Option<String>,
    },
    Code {
        #[serde(default)]
        text: String,
        #[serde(default)]
        language: Option<String>,
    },
}

/// Convert specs to block-create requests, one-to-one, recursively.
pub fn block_specs_to_requests(specs: &[BlockSpec]) -> Vec<Value> {
    specs.iter().map(spec_to_request).collect()
}

fn spec_to_request(spec: &BlockSpec) -> Value {
    match spec {
        BlockSpec::Paragraph { text } => json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": { "rich_text": rich_text(text) }
        }),
        BlockSpec::Heading1 { text } => heading_request("heading_1", text),
        BlockSpec::Heading2 { text } => heading_request("heading_2", text),
        BlockSpec::Heading3 { text } => heading_request("heading_3", text),
        BlockSpec::BulletedListItem { text, children } => {
            list_item_request("bulleted_list_item", text, children)
        }
        BlockSpec::NumberedListItem { text, children } => {
            list_item_request("numbered_list_item", text, children)
        }
        BlockSpec::ToDo { text, checked } => json!({
            "object": "block",
            "type": "to_do",
            "to_do": { "rich_text": rich_text(text), "checked": checked }
        }),
        BlockSpec::Toggle { title, children } => {
            let resolved = title
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| derive_toggle_title(children));
            let mut body = json!({ "rich_text": rich_text(&resolved) });
            if !children.is_empty() {
                body["children"] = Value::Array(block_specs_to_requests(children));
            }
            json!({ "object": "block", "type": "toggle", "toggle": body })
        }
        BlockSpec::Quote { text } => json!({
            "object": "block",
            "type": "quote",
            "quote": { "rich_text": rich_text(text) }
        }),
        BlockSpec::Callout { text, icon } => {
            let mut body = json!({ "rich_text": rich_text(text) });
            if let Some(icon) = icon {
                body["icon"] = json!({ "type": "emoji", "emoji": icon });
            }
            json!({ "object": "block", "type": "callout", "callout": body })
        }
        BlockSpec::Code { text, language } => json!({
            "object": "block",
            "type": "code",
            "code": {
                "rich_text": rich_text(text),
                "language": language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE)
            }
        }),
    }
}

fn heading_request(kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": rich_text(text) }
    })
}

fn list_item_request(kind: &str, text: &str, children: &[BlockSpec]) -> Value {
    let mut body = json!({ "rich_text": rich_text(text) });
    if !children.is_empty() {
        body["children"] = Value::Array(block_specs_to_requests(children));
    }
    json!({ "object": "block", "type": kind, kind: body })
}

fn rich_text(text: &str) -> Value {
    json!([ { "type": "text", "text": { "content": sanitize_text(text) } } ])
}

/// The host rejects empty rich text; a single space is the minimal content.
fn sanitize_text(value: &str) -> String {
    if value.trim().is_empty() {
        return " ".to_string();
    }
    clamp_chars(value, MAX_TEXT_LEN)
}

/// A toggle without a usable title gets one derived from its children:
/// first heading, else first child with displayable text, else the first
/// child, else a literal fallback.
fn derive_toggle_title(children: &[BlockSpec]) -> String {
    if children.is_empty() {
        return DEFAULT_TOGGLE_TITLE.to_string();
    }
    let heading = children.iter().find(|child| {
        matches!(
            child,
            BlockSpec::Heading1 { .. } | BlockSpec::Heading2 { .. } | BlockSpec::Heading3 { .. }
        )
    });
    let candidate = heading
        .or_else(|| {
            children
                .iter()
                .find(|child| !display_text(child).trim().is_empty())
        })
        .or_else(|| children.first());
    let raw = candidate
        .map(|child| display_text(child).trim().to_string())
        .unwrap_or_default();
    let title = if raw.is_empty() {
        DEFAULT_TOGGLE_TITLE.to_string()
    } else {
        raw
    };
    clamp_chars(&title, MAX_TOGGLE_TITLE_LEN)
}

fn display_text(spec: &BlockSpec) -> &str {
    match spec {
        BlockSpec::Paragraph { text }
        | BlockSpec::Heading1 { text }
        | BlockSpec::Heading2 { text }
        | BlockSpec::Heading3 { text }
        | BlockSpec::Quote { text }
        | BlockSpec::BulletedListItem { text, .. }
        | BlockSpec::NumberedListItem { text, .. }
        | BlockSpec::ToDo { text, .. }
        | BlockSpec::Callout { text, .. }
        | BlockSpec::Code { text, .. } => text,
        BlockSpec::Toggle { title, .. } => title.as_deref().unwrap_or(""),
    }
}

fn clamp_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
