//! Rewrite orchestration: prompt assembly, model call, response parsing,
//! and the replace-page mutation.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::notion::{block_specs_to_requests, BlockSpec, NotionClient, NotionError};
use crate::openrouter::{ChatMessage, OpenRouterClient, OpenRouterError};

/// Appends to a page are capped by the host; larger trees go out in batches.
pub const APPEND_BATCH_SIZE: usize = 50;

const REWRITE_TEMPERATURE: f64 = 0.2;

const SYSTEM_PROMPT: &str = "You are an elite knowledge architect assisting with reorganizing Notion documentation.
- Preserve all factual information while dramatically improving readability.
- Start the page with a concise orientation (summary or key outcomes).
- Structure the content into nested toggle blocks that provide a skimmable overview first, then allow drilling down.
- Use informative toggle titles, and place details, lists, and examples within nested toggles.
- When useful, convert dense paragraphs into bullet points or tables, but remain faithful to original meaning.
- Maintain references, links, and metadata already present.
- Respond with pure JSON (no code fences) describing the rewritten page using the agreed schema.";

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Notion(#[from] NotionError),
    #[error(transparent)]
    Model(#[from] OpenRouterError),
    #[error("failed to parse rewrite response: {0}")]
    Parse(String),
    #[error("language model returned no blocks; aborting rewrite to avoid wiping the page")]
    EmptyRewrite,
}

/// Everything one rewrite needs, built once and passed by value.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    pub page_id: String,
    pub page_title: String,
    pub root_block_ids: Vec<String>,
    pub page_markdown: String,
    pub override_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RewriteResponsePayload {
    #[serde(default)]
    pub page_title: Option<String>,
    pub blocks: Vec<BlockSpec>,
}

/// Run the full rewrite: prompt the model, parse its block tree, then
/// replace the page content. The empty-tree guard runs before any deletion
/// so a bad model response can never leave the page blank.
pub async fn rewrite_page(
    notion: &NotionClient,
    model: &OpenRouterClient,
    context: RewriteContext,
) -> Result<(), RewriteError> {
    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(&context)),
    ];
    let raw = model.chat_completion(&messages, REWRITE_TEMPERATURE).await?;
    let parsed = parse_rewrite_response(&raw)?;
    let requests = block_specs_to_requests(&parsed.blocks);

    if requests.is_empty() {
        return Err(RewriteError::EmptyRewrite);
    }

    // Delete-then-append is not transactional; a failure mid-sequence can
    // leave the page with some old blocks gone and no new ones appended.
    delete_existing_blocks(notion, &context.root_block_ids).await?;
    append_blocks(notion, &context.page_id, &requests).await?;
    update_page_title_if_needed(
        notion,
        &context.page_id,
        &context.page_title,
        parsed.page_title.as_deref(),
    )
    .await?;

    info!(
        "replaced {} blocks with {} on page {}",
        context.root_block_ids.len(),
        requests.len(),
        context.page_id
    );
    Ok(())
}

fn build_user_prompt(context: &RewriteContext) -> String {
    let additional = match &context.override_instructions {
        Some(instructions) => format!(
            "Additional rewrite instructions provided by the user comment: \"{}\"\n",
            instructions.trim()
        ),
        None => "No additional rewrite instructions were provided in the triggering comment.\n"
            .to_string(),
    };

    format!(
        "The original Notion page is titled \"{}\".\n{}\nProvide a JSON response with the structure: {{\"page_title\": string (optional), \"blocks\": BlockSpec[]}} where BlockSpec can represent paragraph, heading_1/2/3, bulleted_list_item, numbered_list_item, toggle, quote, callout, or code as described earlier.\nEach toggle must contain informative children blocks; paragraphs should be concise.\nHere is the current page content serialized in Markdown-like form:\n\n{}",
        context.page_title, additional, context.page_markdown
    )
}

/// Parse the model's textual completion into a response payload. All
/// failures are hard errors carrying the underlying cause.
pub fn parse_rewrite_response(raw: &str) -> Result<RewriteResponsePayload, RewriteError> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|err| RewriteError::Parse(format!("invalid JSON: {err}")))?;

    if !value.is_object() {
        return Err(RewriteError::Parse(
            "response is not a JSON object".to_string(),
        ));
    }
    if !value.get("blocks").map(Value::is_array).unwrap_or(false) {
        return Err(RewriteError::Parse(
            "response missing blocks array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|err| RewriteError::Parse(format!("invalid block specs: {err}")))
}

/// Models sometimes wrap the JSON in a code fence despite instructions.
fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}

async fn delete_existing_blocks(
    notion: &NotionClient,
    block_ids: &[String],
) -> Result<(), NotionError> {
    for id in block_ids {
        notion.delete_block(id).await?;
    }
    Ok(())
}

async fn append_blocks(
    notion: &NotionClient,
    page_id: &str,
    requests: &[Value],
) -> Result<(), NotionError> {
    for batch in requests.chunks(APPEND_BATCH_SIZE) {
        notion.append_block_children(page_id, batch).await?;
    }
    Ok(())
}

async fn update_page_title_if_needed(
    notion: &NotionClient,
    page_id: &str,
    current_title: &str,
    next_title: Option<&str>,
) -> Result<(), NotionError> {
    let Some(next) = next_title.map(str::trim).filter(|title| !title.is_empty()) else {
        return Ok(());
    };
    if next == current_title.trim() {
        return Ok(());
    }
    notion.update_page_title(page_id, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_parses() {
        let payload =
            parse_rewrite_response(r#"{"blocks":[{"type":"paragraph","text":"hi"}]}"#).unwrap();
        assert_eq!(payload.blocks.len(), 1);
        assert!(payload.page_title.is_none());
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "```json\n{\"page_title\":\"New\",\"blocks\":[{\"type\":\"quote\",\"text\":\"q\"}]}\n```";
        let payload = parse_rewrite_response(raw).unwrap();
        assert_eq!(payload.page_title.as_deref(), Some("New"));
        assert_eq!(payload.blocks.len(), 1);
    }

    #[test]
    fn bare_fence_without_language_tag_parses() {
        let raw = "```\n{\"blocks\":[]}\n```";
        let payload = parse_rewrite_response(raw).unwrap();
        assert!(payload.blocks.is_empty());
    }

    #[test]
    fn non_json_is_a_parse_error_with_cause() {
        let err = parse_rewrite_response("here are your blocks!").unwrap_err();
        assert!(matches!(err, RewriteError::Parse(_)));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn non_object_response_is_rejected() {
        let err = parse_rewrite_response("[1,2,3]").unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn missing_blocks_array_is_rejected() {
        let err = parse_rewrite_response(r#"{"page_title":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("missing blocks array"));

        let err = parse_rewrite_response(r#"{"blocks":"nope"}"#).unwrap_err();
        assert!(err.to_string().contains("missing blocks array"));
    }

    #[test]
    fn unknown_block_kind_is_rejected_with_cause() {
        let err =
            parse_rewrite_response(r#"{"blocks":[{"type":"divider"}]}"#).unwrap_err();
        assert!(err.to_string().contains("invalid block specs"));
    }

    #[test]
    fn user_prompt_embeds_title_instructions_and_markdown() {
        let context = RewriteContext {
            page_id: "p1".to_string(),
            page_title: "Launch Plan".to_string(),
            root_block_ids: vec![],
            page_markdown: "# Title\n\nBody\n".to_string(),
            override_instructions: Some("make it shorter".to_string()),
        };
        let prompt = build_user_prompt(&context);
        assert!(prompt.contains("\"Launch Plan\""));
        assert!(prompt.contains("make it shorter"));
        assert!(prompt.contains("# Title"));
    }

    #[test]
    fn user_prompt_notes_absent_instructions() {
        let context = RewriteContext {
            page_id: "p1".to_string(),
            page_title: "T".to_string(),
            root_block_ids: vec![],
            page_markdown: String::new(),
            override_instructions: None,
        };
        assert!(build_user_prompt(&context)
            .contains("No additional rewrite instructions were provided"));
    }
}
