//! Comment operations.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::client::OctocrabClient;
use super::error::{GitHubError, Result};
use super::issue::normalize_newlines;

/// An issue or PR comment as fetched from GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteComment {
    pub id: u64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Body with CRLF normalized to LF.
    pub body: String,
    pub html_url: String,
}

impl From<octocrab::models::issues::Comment> for RemoteComment {
    fn from(c: octocrab::models::issues::Comment) -> Self {
        Self {
            id: c.id.0,
            author: c.user.login,
            created_at: c.created_at,
            updated_at: c.updated_at,
            body: normalize_newlines(c.body.as_deref().unwrap_or_default()),
            html_url: c.html_url.to_string(),
        }
    }
}

/// Trait for comment operations.
#[async_trait::async_trait]
pub trait CommentClient: Send + Sync {
    /// Get every comment of an issue or PR, oldest first.
    async fn get_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RemoteComment>>;

    /// Update a comment using REST API.
    async fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<()>;

    /// Create a new comment on an issue or PR.
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<RemoteComment>;
}

#[async_trait::async_trait]
impl CommentClient for OctocrabClient {
    async fn get_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RemoteComment>> {
        debug!(owner, repo, number, "fetching comments");
        let first = self
            .client
            .issues(owner, repo)
            .list_comments(number)
            .per_page(100)
            .send()
            .await
            .map_err(GitHubError::from)?;
        let all = self
            .client
            .all_pages(first)
            .await
            .map_err(GitHubError::from)?;
        Ok(all.into_iter().map(RemoteComment::from).collect())
    }

    async fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<()> {
        // Use REST API: PATCH /repos/{owner}/{repo}/issues/comments/{comment_id}
        let route = format!("/repos/{owner}/{repo}/issues/comments/{comment_id}");
        let _response: serde_json::Value = self
            .client
            .patch(route, Some(&serde_json::json!({ "body": body })))
            .await
            .map_err(GitHubError::from)?;
        Ok(())
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<RemoteComment> {
        let comment = self
            .client
            .issues(owner, repo)
            .create_comment(number, body)
            .await
            .map_err(GitHubError::from)?;
        Ok(comment.into())
    }
}
