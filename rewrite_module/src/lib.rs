//! Webhook-triggered Notion page rewriter.
//!
//! A comment containing the configured trigger keyword authorizes a rewrite:
//! the page's block tree is fetched and serialized, handed to a language
//! model for restructuring, and the model's structured response is written
//! back as a fresh tree of blocks replacing the old one.

pub mod config;
pub mod events;
pub mod notion;
pub mod openrouter;
pub mod rewrite;
pub mod signature;
pub mod webhook;
