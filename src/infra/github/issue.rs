//! Issue operations.
//!
//! Pull requests are issues too in the REST API, so titles and bodies of both
//! are read and written here.

use octocrab::params::{Direction, State, issues::Sort};
use tracing::debug;

use super::client::OctocrabClient;
use super::error::{GitHubError, Result};

/// An issue or pull request as fetched from GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub number: u64,
    pub title: String,
    /// Body with CRLF normalized to LF. Empty when GitHub has none.
    pub body: String,
    pub html_url: String,
    pub author: String,
    pub is_pull_request: bool,
}

/// Number and page URL of an item that was just created or looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLink {
    pub number: u64,
    pub html_url: String,
}

/// Trait for issue operations.
#[async_trait::async_trait]
pub trait IssueClient: Send + Sync {
    /// Get an issue or PR by number.
    async fn get_item(&self, owner: &str, repo: &str, number: u64) -> Result<RemoteItem>;

    /// Update title and body of an issue or PR.
    async fn update_item(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<()>;

    /// Update only the body.
    async fn update_item_body(&self, owner: &str, repo: &str, number: u64, body: &str)
    -> Result<()>;

    /// Create an issue.
    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<ItemLink>;

    /// The most recently created issue (pull requests excluded).
    async fn latest_issue(&self, owner: &str, repo: &str) -> Result<Option<ItemLink>>;
}

pub(crate) fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n")
}

#[async_trait::async_trait]
impl IssueClient for OctocrabClient {
    async fn get_item(&self, owner: &str, repo: &str, number: u64) -> Result<RemoteItem> {
        debug!(owner, repo, number, "fetching item");
        let issue = self
            .client
            .issues(owner, repo)
            .get(number)
            .await
            .map_err(GitHubError::from)?;
        Ok(RemoteItem {
            number: issue.number,
            title: issue.title,
            body: normalize_newlines(issue.body.as_deref().unwrap_or_default()),
            html_url: issue.html_url.to_string(),
            author: issue.user.login,
            is_pull_request: issue.pull_request.is_some(),
        })
    }

    async fn update_item(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        title: &str,
        body: &str,
    ) -> Result<()> {
        debug!(owner, repo, number, "updating title and body");
        self.client
            .issues(owner, repo)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await
            .map_err(GitHubError::from)?;
        Ok(())
    }

    async fn update_item_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<()> {
        debug!(owner, repo, number, "updating body");
        self.client
            .issues(owner, repo)
            .update(number)
            .body(body)
            .send()
            .await
            .map_err(GitHubError::from)?;
        Ok(())
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<ItemLink> {
        let issue = self
            .client
            .issues(owner, repo)
            .create(title)
            .body(body)
            .send()
            .await
            .map_err(GitHubError::from)?;
        Ok(ItemLink {
            number: issue.number,
            html_url: issue.html_url.to_string(),
        })
    }

    async fn latest_issue(&self, owner: &str, repo: &str) -> Result<Option<ItemLink>> {
        let page = self
            .client
            .issues(owner, repo)
            .list()
            .state(State::All)
            .sort(Sort::Created)
            .direction(Direction::Descending)
            .per_page(20)
            .send()
            .await
            .map_err(GitHubError::from)?;
        Ok(page
            .items
            .into_iter()
            .find(|i| i.pull_request.is_none())
            .map(|i| ItemLink {
                number: i.number,
                html_url: i.html_url.to_string(),
            }))
    }
}
