//! Repository and user operations.

use super::client::OctocrabClient;
use super::error::{GitHubError, Result};

/// Trait for repository operations.
#[async_trait::async_trait]
pub trait RepoClient: Send + Sync {
    /// Check if a repository is private.
    async fn is_repo_private(&self, owner: &str, repo: &str) -> Result<bool>;

    /// Get the default branch name from GitHub API.
    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String>;

    /// Login of the authenticated user.
    async fn current_user_login(&self) -> Result<String>;
}

#[async_trait::async_trait]
impl RepoClient for OctocrabClient {
    async fn is_repo_private(&self, owner: &str, repo: &str) -> Result<bool> {
        let repository = self
            .client
            .repos(owner, repo)
            .get()
            .await
            .map_err(GitHubError::from)?;
        // Unknown visibility counts as private so mirrors stay secret.
        Ok(repository.private.unwrap_or(true))
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let repository = self
            .client
            .repos(owner, repo)
            .get()
            .await
            .map_err(GitHubError::from)?;
        Ok(repository
            .default_branch
            .unwrap_or_else(|| "main".to_string()))
    }

    async fn current_user_login(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .map_err(GitHubError::from)?;
        Ok(user.login)
    }
}
