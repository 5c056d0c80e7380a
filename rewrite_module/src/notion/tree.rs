//! Fetching and serializing the page's block tree.
//!
//! `fetch_block_children` drains the paginated children listing for one
//! container; `expand_blocks` recursively materializes the full tree;
//! `blocks_to_markdown` renders it as indented markdown-like text for the
//! model. The text is model input only, not a re-parseable grammar.

use futures::future::{self, BoxFuture, FutureExt};

use super::client::{NotionClient, NotionError};
use super::models::{Block, BlockKind, ExpandedBlock};

/// Fetch the full ordered set of direct children of a container, following
/// the pagination cursor until the host reports no more results. Page
/// request failures propagate; there is no local retry.
pub async fn fetch_block_children(
    client: &NotionClient,
    block_id: &str,
) -> Result<Vec<Block>, NotionError> {
    let mut results = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = client.list_block_children(block_id, cursor.as_deref()).await?;
        results.extend(page.results.iter().filter_map(Block::from_value));
        cursor = if page.has_more { page.next_cursor } else { None };
        if cursor.is_none() {
            break;
        }
    }

    Ok(results)
}

/// Recursively expand every block that has children. Siblings are fetched
/// concurrently; the result order always matches the input order.
pub fn expand_blocks<'a>(
    client: &'a NotionClient,
    blocks: Vec<Block>,
) -> BoxFuture<'a, Result<Vec<ExpandedBlock>, NotionError>> {
    async move {
        let expansions = blocks.into_iter().map(|block| async move {
            let children = if block.has_children {
                let fetched = fetch_block_children(client, &block.id).await?;
                expand_blocks(client, fetched).await?
            } else {
                Vec::new()
            };
            Ok::<_, NotionError>(ExpandedBlock { block, children })
        });
        future::try_join_all(expansions).await
    }
    .boxed()
}

/// Serialize an expanded tree to the linear text form fed to the model.
/// Top-level blocks are separated by a blank line.
pub fn blocks_to_markdown(blocks: &[ExpandedBlock]) -> String {
    blocks
        .iter()
        .map(|block| block_to_markdown(block, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_to_markdown(block: &ExpandedBlock, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let body = match &block.block.kind {
        BlockKind::Paragraph { text } => format!("{indent}{text}\n"),
        BlockKind::Heading1 { text } => format!("{indent}# {text}\n"),
        BlockKind::Heading2 { text } => format!("{indent}## {text}\n"),
        BlockKind::Heading3 { text } => format!("{indent}### {text}\n"),
        BlockKind::BulletedListItem { text } => format!("{indent}- {text}\n"),
        // Literal "1." regardless of position; the model does not need real numbering.
        BlockKind::NumberedListItem { text } => format!("{indent}1. {text}\n"),
        BlockKind::ToDo { text, checked } => {
            format!("{}- [{}] {}\n", indent, if *checked { 'x' } else { ' ' }, text)
        }
        BlockKind::Toggle { title } => {
            let children: String = block
                .children
                .iter()
                .map(|child| block_to_markdown(child, depth + 1))
                .collect();
            return format!("{indent}<toggle title=\"{title}\">\n{children}{indent}</toggle>\n");
        }
        BlockKind::Quote { text } | BlockKind::Callout { text } => format!("{indent}> {text}\n"),
        BlockKind::Code { text, language } => format!(
            "{indent}\n{indent}```{}\n{}\n{indent}```\n",
            language.as_deref().unwrap_or_default(),
            text
        ),
        BlockKind::Unsupported { kind } => format!("{indent}[Unsupported block type: {kind}]\n"),
    };

    let children: String = block
        .children
        .iter()
        .map(|child| block_to_markdown(child, depth + 1))
        .collect();
    format!("{body}{children}")
}
