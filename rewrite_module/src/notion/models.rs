use serde::Deserialize;
use serde_json::Value;

/// One structural unit of a Notion page, with its styled text already
/// reduced to plain text.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph { text: String },
    Heading1 { text: String },
    Heading2 { text: String },
    Heading3 { text: String },
    BulletedListItem { text: String },
    NumberedListItem { text: String },
    ToDo { text: String, checked: bool },
    Toggle { title: String },
    Quote { text: String },
    Callout { text: String },
    Code { text: String, language: Option<String> },
    Unsupported { kind: String },
}

impl Block {
    /// Parse one entry of a block-children listing. Returns `None` for
    /// entries that do not look like blocks at all (no id).
    pub fn from_value(value: &Value) -> Option<Block> {
        let id = value.get("id").and_then(Value::as_str)?.to_string();
        let has_children = value
            .get("has_children")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let kind_name = value.get("type").and_then(Value::as_str).unwrap_or("");
        let data = value.get(kind_name);
        let text = plain_text(data.and_then(|body| body.get("rich_text")));

        let kind = match kind_name {
            "paragraph" => BlockKind::Paragraph { text },
            "heading_1" => BlockKind::Heading1 { text },
            "heading_2" => BlockKind::Heading2 { text },
            "heading_3" => BlockKind::Heading3 { text },
            "bulleted_list_item" => BlockKind::BulletedListItem { text },
            "numbered_list_item" => BlockKind::NumberedListItem { text },
            "to_do" => BlockKind::ToDo {
                text,
                checked: data
                    .and_then(|body| body.get("checked"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "toggle" => BlockKind::Toggle { title: text },
            "quote" => BlockKind::Quote { text },
            "callout" => BlockKind::Callout { text },
            "code" => BlockKind::Code {
                text,
                language: data
                    .and_then(|body| body.get("language"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            other => BlockKind::Unsupported {
                kind: if other.is_empty() {
                    "unknown".to_string()
                } else {
                    other.to_string()
                },
            },
        };

        Some(Block {
            id,
            has_children,
            kind,
        })
    }
}

/// A block with its fully resolved children, recursively. Built by the tree
/// expander, consumed once by the serializer, never persisted.
#[derive(Debug, Clone)]
pub struct ExpandedBlock {
    pub block: Block,
    pub children: Vec<ExpandedBlock>,
}

/// Concatenate the `plain_text` of a rich-text array.
pub fn plain_text(rich_text: Option<&Value>) -> String {
    rich_text
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("plain_text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// One page of a block-children listing.
#[derive(Debug, Deserialize)]
pub struct BlockChildrenPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Parent reference carried by comments and blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ParentRef {
    #[serde(rename = "page_id")]
    Page { page_id: String },
    #[serde(rename = "block_id")]
    Block { block_id: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichTextItem {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

impl Comment {
    /// Comment text as a single string, segments joined with one space.
    pub fn plain_text(&self) -> String {
        self.rich_text
            .iter()
            .map(|item| item.plain_text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

impl Page {
    /// Extract the page title from the `title`-typed property.
    pub fn title(&self) -> String {
        for property in self.properties.values() {
            if property.get("type").and_then(Value::as_str) != Some("title") {
                continue;
            }
            let items = property
                .get("title")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if !items.is_empty() {
                return items
                    .iter()
                    .filter_map(|item| item.get("plain_text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("");
            }
        }
        "Untitled".to_string()
    }
}
