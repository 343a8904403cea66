//! Pull request operations.

use octocrab::params::State;
use tracing::debug;

use super::client::OctocrabClient;
use super::error::{GitHubError, Result};
use super::issue::ItemLink;

/// Parameters for creating a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrParams {
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Trait for pull request operations.
#[async_trait::async_trait]
pub trait PrClient: Send + Sync {
    /// Create a pull request.
    async fn create_pull_request(&self, params: CreatePrParams) -> Result<ItemLink>;

    /// Most recent PR (any state) whose head is `{owner}:{branch}`.
    async fn find_pr_for_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<ItemLink>>;
}

#[async_trait::async_trait]
impl PrClient for OctocrabClient {
    async fn create_pull_request(&self, params: CreatePrParams) -> Result<ItemLink> {
        debug!(head = %params.head, base = %params.base, draft = params.draft, "creating PR");
        let pulls = self.client.pulls(&params.owner, &params.repo);

        let pr = pulls
            .create(&params.title, &params.head, &params.base)
            .body(&params.body)
            .draft(Some(params.draft))
            .send()
            .await
            .map_err(GitHubError::from)?;

        let html_url = pr
            .html_url
            .map(|u| u.to_string())
            .ok_or(GitHubError::MissingHtmlUrl)?;
        Ok(ItemLink {
            number: pr.number,
            html_url,
        })
    }

    async fn find_pr_for_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<ItemLink>> {
        // Search for PRs with this head branch
        let pulls = self
            .client
            .pulls(owner, repo)
            .list()
            .head(format!("{owner}:{branch}"))
            .state(State::All)
            .send()
            .await
            .map_err(GitHubError::from)?;

        // Get the first (most recent) PR for this branch
        let Some(pr) = pulls.items.into_iter().next() else {
            return Ok(None);
        };
        let html_url = pr.html_url.map(|u| u.to_string()).unwrap_or_default();
        Ok(Some(ItemLink {
            number: pr.number,
            html_url,
        }))
    }
}
