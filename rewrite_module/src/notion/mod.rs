//! Notion API surface: models, client, tree round-trip helpers, and the
//! reverse builder from model block specs to create requests.

pub mod block_spec;
pub mod client;
pub mod models;
pub mod tree;

pub use block_spec::{block_specs_to_requests, BlockSpec};
pub use client::{NotionClient, NotionError};
pub use models::{Block, BlockChildrenPage, BlockKind, Comment, ExpandedBlock, Page, ParentRef};
pub use tree::{blocks_to_markdown, expand_blocks, fetch_block_children};
