//! The per-delivery pipeline: normalize the body, resolve the triggering
//! comment, detect the trigger keyword, resolve the target page, gather its
//! content, and run the rewrite. One comment event failing never aborts the
//! other events in the same delivery.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::events::{
    collect_comment_candidates, extract_candidate_comment_ids, string_at, CommentCandidate,
};
use crate::notion::{
    blocks_to_markdown, expand_blocks, fetch_block_children, Comment, NotionClient, NotionError,
    ParentRef,
};
use crate::openrouter::OpenRouterClient;
use crate::rewrite::{rewrite_page, RewriteContext, RewriteError};

/// Process one webhook delivery. Per-event failures are logged and skipped.
pub async fn handle_notion_webhook(
    notion: &NotionClient,
    openrouter: &OpenRouterClient,
    trigger_keyword: &str,
    body: &Value,
) -> Result<(), RewriteError> {
    let candidates = collect_comment_candidates(body);
    if candidates.is_empty() {
        debug!("webhook delivery carried no comment events");
        return Ok(());
    }

    for candidate in &candidates {
        if let Err(err) = process_candidate(notion, openrouter, trigger_keyword, body, candidate).await
        {
            error!("failed to process comment event: {}", err);
        }
    }
    Ok(())
}

async fn process_candidate(
    notion: &NotionClient,
    openrouter: &OpenRouterClient,
    keyword: &str,
    body: &Value,
    candidate: &CommentCandidate,
) -> Result<(), RewriteError> {
    let Some(comment_id) = candidate_comment_id(candidate, body) else {
        return Ok(());
    };
    let Some((comment_id, comment)) =
        retrieve_comment_with_fallback(notion, body, candidate, comment_id).await
    else {
        return Ok(());
    };

    let text = comment.plain_text();
    if !has_trigger_keyword(&text, keyword) {
        debug!("comment {} does not carry the trigger keyword", comment_id);
        return Ok(());
    }
    let instruction = strip_trigger_keyword(&text, keyword);

    let page_id = match page_id_from_body(body) {
        Some(id) => Some(id),
        None => resolve_page_id_from_parent(notion, comment.parent.as_ref()).await?,
    };
    let Some(page_id) = page_id else {
        warn!("unable to resolve page for comment {}", comment_id);
        return Ok(());
    };

    let page = notion.retrieve_page(&page_id).await?;
    let root_blocks = fetch_block_children(notion, &page_id).await?;
    let root_block_ids: Vec<String> = root_blocks.iter().map(|block| block.id.clone()).collect();
    let expanded = expand_blocks(notion, root_blocks).await?;

    let context = RewriteContext {
        page_id: page_id.clone(),
        page_title: page.title(),
        root_block_ids,
        page_markdown: blocks_to_markdown(&expanded),
        override_instructions: Some(instruction).filter(|value| !value.is_empty()),
    };
    rewrite_page(notion, openrouter, context).await?;
    info!("rewrote page {} triggered by comment {}", page_id, comment_id);
    Ok(())
}

fn candidate_comment_id(candidate: &CommentCandidate, body: &Value) -> Option<String> {
    match candidate {
        CommentCandidate::FallbackId(id) => Some(id.clone()),
        CommentCandidate::Event(event) => {
            let data = event.get("data");
            string_at(data, &["id"])
                .or_else(|| string_at(data, &["comment", "id"]))
                .or_else(|| string_at(data, &["comment_id"]))
                .or_else(|| string_at(Some(body), &["payload", "data", "comment", "id"]))
                .or_else(|| string_at(Some(body), &["entity", "id"]))
        }
    }
}

/// Retrieve a comment; for heuristic candidates (no typed event matched),
/// a failed id falls through to the remaining candidates from the body.
async fn retrieve_comment_with_fallback(
    notion: &NotionClient,
    body: &Value,
    candidate: &CommentCandidate,
    comment_id: String,
) -> Option<(String, Comment)> {
    match notion.retrieve_comment(&comment_id).await {
        Ok(comment) => Some((comment_id, comment)),
        Err(err) => {
            debug!("comment {} retrieval failed: {}", comment_id, err);
            if matches!(candidate, CommentCandidate::Event(_)) {
                return None;
            }
            for alt in extract_candidate_comment_ids(body) {
                if alt == comment_id {
                    continue;
                }
                if let Ok(comment) = notion.retrieve_comment(&alt).await {
                    return Some((alt, comment));
                }
            }
            None
        }
    }
}

fn page_id_from_body(body: &Value) -> Option<String> {
    string_at(Some(body), &["payload", "data", "page_id"])
        .or_else(|| string_at(Some(body), &["data", "page_id"]))
}

/// Walk a comment's parent reference up to the owning page. The visited set
/// bounds the walk even if the host returns a cyclic block chain.
pub async fn resolve_page_id_from_parent(
    notion: &NotionClient,
    parent: Option<&ParentRef>,
) -> Result<Option<String>, NotionError> {
    match parent {
        None | Some(ParentRef::Other) => Ok(None),
        Some(ParentRef::Page { page_id }) => Ok(Some(page_id.clone())),
        Some(ParentRef::Block { block_id }) => {
            let mut visited: HashSet<String> = HashSet::new();
            let mut current = Some(block_id.clone());
            while let Some(id) = current {
                if !visited.insert(id.clone()) {
                    warn!("parent chain loops at block {}", id);
                    return Ok(None);
                }
                let block = notion.retrieve_block(&id).await?;
                let parent = block
                    .get("parent")
                    .cloned()
                    .and_then(|value| serde_json::from_value::<ParentRef>(value).ok());
                match parent {
                    Some(ParentRef::Page { page_id }) => return Ok(Some(page_id)),
                    Some(ParentRef::Block { block_id }) => current = Some(block_id),
                    _ => current = None,
                }
            }
            Ok(None)
        }
    }
}

fn keyword_pattern(keyword: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).unwrap()
}

/// Whole-word, case-insensitive trigger match.
pub fn has_trigger_keyword(text: &str, keyword: &str) -> bool {
    keyword_pattern(keyword).is_match(text)
}

/// Remove every whole-word occurrence of the keyword; the trimmed remainder
/// becomes the override instruction.
pub fn strip_trigger_keyword(text: &str, keyword: &str) -> String {
    keyword_pattern(keyword)
        .replace_all(text, "")
        .trim()
        .to_string()
}
