use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::error;

use super::models::{BlockChildrenPage, Comment, Page};

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notion api error: HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Thin capability surface over the Notion REST API. All calls are
/// request-scoped; failures propagate to the per-event handler.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, NOTION_API_BASE)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page, NotionError> {
        let response = self
            .request(Method::GET, format!("{}/pages/{}", self.base_url, page_id))
            .send()
            .await?;
        Ok(self.ensure_success(response, "retrieve page").await?.json().await?)
    }

    pub async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildrenPage, NotionError> {
        let mut builder = self.request(
            Method::GET,
            format!("{}/blocks/{}/children", self.base_url, block_id),
        );
        if let Some(cursor) = start_cursor {
            builder = builder.query(&[("start_cursor", cursor)]);
        }
        let response = builder.send().await?;
        Ok(self
            .ensure_success(response, "list block children")
            .await?
            .json()
            .await?)
    }

    pub async fn retrieve_block(&self, block_id: &str) -> Result<Value, NotionError> {
        let response = self
            .request(Method::GET, format!("{}/blocks/{}", self.base_url, block_id))
            .send()
            .await?;
        Ok(self
            .ensure_success(response, "retrieve block")
            .await?
            .json()
            .await?)
    }

    pub async fn retrieve_comment(&self, comment_id: &str) -> Result<Comment, NotionError> {
        let response = self
            .request(
                Method::GET,
                format!("{}/comments/{}", self.base_url, comment_id),
            )
            .send()
            .await?;
        Ok(self
            .ensure_success(response, "retrieve comment")
            .await?
            .json()
            .await?)
    }

    pub async fn delete_block(&self, block_id: &str) -> Result<(), NotionError> {
        let response = self
            .request(
                Method::DELETE,
                format!("{}/blocks/{}", self.base_url, block_id),
            )
            .send()
            .await?;
        self.ensure_success(response, "delete block").await?;
        Ok(())
    }

    pub async fn append_block_children(
        &self,
        block_id: &str,
        children: &[Value],
    ) -> Result<(), NotionError> {
        let response = self
            .request(
                Method::PATCH,
                format!("{}/blocks/{}/children", self.base_url, block_id),
            )
            .json(&json!({ "children": children }))
            .send()
            .await?;
        self.ensure_success(response, "append block children").await?;
        Ok(())
    }

    pub async fn update_page_title(&self, page_id: &str, title: &str) -> Result<(), NotionError> {
        let properties = json!({
            "title": {
                "title": [ { "type": "text", "text": { "content": title } } ]
            }
        });
        let response = self
            .request(Method::PATCH, format!("{}/pages/{}", self.base_url, page_id))
            .json(&json!({ "properties": properties }))
            .send()
            .await?;
        self.ensure_success(response, "update page title").await?;
        Ok(())
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn ensure_success(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, NotionError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("notion {} failed: {} - {}", what, status, body);
        Err(NotionError::Api { status, body })
    }
}
