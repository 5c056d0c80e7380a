#![allow(dead_code)]

use serde_json::{json, Value};

pub fn paragraph_block(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "type": "paragraph",
        "has_children": false,
        "paragraph": { "rich_text": [ { "plain_text": text } ] }
    })
}

pub fn children_page(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "results": results,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor,
    })
}

pub fn comment(id: &str, text: &str, page_id: &str) -> Value {
    json!({
        "id": id,
        "rich_text": [ { "plain_text": text } ],
        "parent": { "type": "page_id", "page_id": page_id }
    })
}

pub fn page(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "properties": {
            "Name": { "type": "title", "title": [ { "plain_text": title } ] }
        }
    })
}

/// A chat-completions response whose content is the given JSON value,
/// serialized the way a model would return it.
pub fn completion_with(content: &Value) -> Value {
    json!({
        "choices": [ { "message": { "content": content.to_string() } } ]
    })
}
