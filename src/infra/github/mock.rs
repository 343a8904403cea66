//! wiremock-based GitHub mock server for testing.
//!
//! Provides `GitHubMockServer` for HTTP-level mocking of GitHub API calls.
//!
//! # Usage
//!
//! Use the builder pattern via `mock.repo(owner, repo)` for a fluent API:
//!
//! ```ignore
//! let mock = GitHubMockServer::start().await;
//! let ctx = mock.repo("owner", "repo");
//!
//! // Issue / PR operations
//! ctx.issue(123).get().await;
//! ctx.issue(123).title("Custom").body("Body").pull_request(true).get().await;
//! ctx.issue(123).update().await;
//! ctx.issue(123).create().await;
//!
//! // Comment operations
//! ctx.issue(123).comments(&[MockComment::new(1, "alice", "hi")]).await;
//! ctx.issue(123).create_comment(99, "me").await;
//! ctx.comment().update().await;
//!
//! // Repository / PR operations
//! ctx.repo_info().private(true).default_branch("develop").get().await;
//! ctx.pull_request(1).create().await;
//!
//! // Server-level
//! mock.current_user("testuser").await;
//! mock.gist("0123456789abcdef0123").owner("me").get().await;
//! ```

use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::client::OctocrabClient;

/// Create a mock user JSON object for octocrab Author model.
fn mock_user(login: &str) -> serde_json::Value {
    json!({
        "login": login,
        "id": 1,
        "node_id": "U_test",
        "avatar_url": "https://avatars.githubusercontent.com/u/1",
        "gravatar_id": "",
        "url": format!("https://api.github.com/users/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("https://api.github.com/users/{login}/followers"),
        "following_url": format!("https://api.github.com/users/{login}/following{{/other_user}}"),
        "gists_url": format!("https://api.github.com/users/{login}/gists{{/gist_id}}"),
        "starred_url": format!("https://api.github.com/users/{login}/starred{{/owner}}{{/repo}}"),
        "subscriptions_url": format!("https://api.github.com/users/{login}/subscriptions"),
        "organizations_url": format!("https://api.github.com/users/{login}/orgs"),
        "repos_url": format!("https://api.github.com/users/{login}/repos"),
        "events_url": format!("https://api.github.com/users/{login}/events{{/privacy}}"),
        "received_events_url": format!("https://api.github.com/users/{login}/received_events"),
        "type": "User",
        "site_admin": false
    })
}

/// Comment definition for test setup.
#[derive(Clone)]
pub struct MockComment<'a> {
    pub id: u64,
    pub author: &'a str,
    pub body: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

impl<'a> MockComment<'a> {
    pub fn new(id: u64, author: &'a str, body: &'a str) -> Self {
        Self {
            id,
            author,
            body,
            created_at: "2024-01-01T12:00:00Z",
            updated_at: "2024-01-01T12:00:00Z",
        }
    }

    pub fn updated_at(mut self, ts: &'a str) -> Self {
        self.updated_at = ts;
        self
    }
}

/// Create a mock comment JSON object for octocrab Comment model.
fn mock_comment(owner: &str, repo: &str, number: u64, c: &MockComment<'_>) -> serde_json::Value {
    let id = c.id;
    json!({
        "id": id,
        "node_id": format!("IC_{id}"),
        "url": format!("https://api.github.com/repos/{owner}/{repo}/issues/comments/{id}"),
        "html_url": format!("https://github.com/{owner}/{repo}/issues/{number}#issuecomment-{id}"),
        "issue_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}"),
        "body": c.body,
        "author_association": "OWNER",
        "user": mock_user(c.author),
        "created_at": c.created_at,
        "updated_at": c.updated_at
    })
}

/// Create a mock issue JSON object for octocrab Issue model.
fn mock_issue(
    owner: &str,
    repo: &str,
    number: u64,
    title: &str,
    body: Option<&str>,
    author: &str,
    is_pull_request: bool,
) -> serde_json::Value {
    let kind = if is_pull_request { "pull" } else { "issues" };
    let mut issue = json!({
        "id": number,
        "node_id": "I_test",
        "url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}"),
        "repository_url": format!("https://api.github.com/repos/{owner}/{repo}"),
        "labels_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/labels{{/name}}"),
        "comments_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/comments"),
        "events_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/events"),
        "html_url": format!("https://github.com/{owner}/{repo}/{kind}/{number}"),
        "number": number,
        "state": "open",
        "title": title,
        "body": body,
        "user": mock_user(author),
        "labels": [],
        "assignees": [],
        "author_association": "OWNER",
        "milestone": null,
        "locked": false,
        "comments": 0,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z"
    });
    if is_pull_request {
        issue["pull_request"] = json!({
            "url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}"),
            "html_url": format!("https://github.com/{owner}/{repo}/pull/{number}"),
            "diff_url": format!("https://github.com/{owner}/{repo}/pull/{number}.diff"),
            "patch_url": format!("https://github.com/{owner}/{repo}/pull/{number}.patch")
        });
    }
    issue
}

/// Create a mock repository JSON object for octocrab Repository model.
fn mock_repository(
    owner: &str,
    repo: &str,
    is_private: bool,
    default_branch: &str,
) -> serde_json::Value {
    json!({
        "id": 1,
        "node_id": "R_test",
        "name": repo,
        "full_name": format!("{owner}/{repo}"),
        "private": is_private,
        "owner": mock_user(owner),
        "html_url": format!("https://github.com/{owner}/{repo}"),
        "description": "Test repository",
        "fork": false,
        "url": format!("https://api.github.com/repos/{owner}/{repo}"),
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "pushed_at": "2024-01-01T00:00:00Z",
        "default_branch": default_branch
    })
}

/// Create a mock pull request JSON object for octocrab PullRequest model.
fn mock_pull_request(owner: &str, repo: &str, number: u64, head: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "node_id": "PR_test",
        "number": number,
        "state": "open",
        "locked": false,
        "title": "Test PR",
        "body": "Test body",
        "user": mock_user("testuser"),
        "url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}"),
        "html_url": format!("https://github.com/{owner}/{repo}/pull/{number}"),
        "diff_url": format!("https://github.com/{owner}/{repo}/pull/{number}.diff"),
        "patch_url": format!("https://github.com/{owner}/{repo}/pull/{number}.patch"),
        "issue_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}"),
        "commits_url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}/commits"),
        "review_comments_url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}/comments"),
        "review_comment_url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/comments{{/number}}"),
        "comments_url": format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/comments"),
        "statuses_url": format!("https://api.github.com/repos/{owner}/{repo}/statuses/abc123"),
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "head": {
            "label": format!("{owner}:{head}"),
            "ref": head,
            "sha": "abc123"
        },
        "base": {
            "label": format!("{owner}:main"),
            "ref": "main",
            "sha": "def456"
        }
    })
}

fn mock_gist(id: &str, owner: &str, files: &[&str], version: &str) -> serde_json::Value {
    let files: serde_json::Map<String, serde_json::Value> = files
        .iter()
        .map(|f| (f.to_string(), json!({"filename": f, "type": "text/markdown"})))
        .collect();
    json!({
        "id": id,
        "html_url": format!("https://gist.github.com/{id}"),
        "git_push_url": format!("https://gist.github.com/{id}.git"),
        "public": false,
        "files": files,
        "owner": mock_user(owner),
        "history": [{"version": version, "committed_at": "2024-01-01T00:00:00Z"}]
    })
}

/// wiremock-based GitHub mock server for testing.
///
/// This provides HTTP-level mocking for GitHub API endpoints, allowing tests
/// to verify actual HTTP requests rather than mocking at the trait level.
pub struct GitHubMockServer {
    server: MockServer,
}

impl GitHubMockServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get an OctocrabClient configured to use this mock server.
    pub fn client(&self) -> OctocrabClient {
        OctocrabClient::with_base_url(&self.server.uri(), "test-token").unwrap()
    }

    /// The underlying server, for one-off mocks.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Requests received for `method` on exactly `path`.
    pub async fn requests(&self, http_method: &str, url_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == url_path)
            .collect()
    }

    /// Create a repository context for building mocks.
    pub fn repo<'a>(&'a self, owner: &'a str, repo: &'a str) -> MockRepoContext<'a> {
        MockRepoContext {
            server: &self.server,
            owner,
            repo,
        }
    }

    /// Mock GET /user for current user.
    pub async fn current_user(&self, login: &str) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_user(login)))
            .mount(&self.server)
            .await;
    }

    /// Create a gist mock builder.
    pub fn gist<'a>(&'a self, id: &'a str) -> MockGistBuilder<'a> {
        MockGistBuilder {
            server: &self.server,
            id,
            owner: "testuser",
            files: vec!["repo#1.md"],
            version: "rev1",
        }
    }
}

// ============ Builder Pattern API ============

/// Repository context for building mocks.
pub struct MockRepoContext<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
}

impl<'a> MockRepoContext<'a> {
    /// Create an issue mock builder.
    pub fn issue(&self, number: u64) -> MockIssueBuilder<'_> {
        MockIssueBuilder {
            server: self.server,
            owner: self.owner,
            repo: self.repo,
            number,
            title: "Test Issue",
            body: Some("Test body"),
            author: "testuser",
            is_pull_request: false,
        }
    }

    /// Create a comment mock builder (for update operations).
    pub fn comment(&self) -> MockCommentBuilder<'_> {
        MockCommentBuilder {
            server: self.server,
            owner: self.owner,
            repo: self.repo,
        }
    }

    /// Create a repository info mock builder.
    pub fn repo_info(&self) -> MockRepoInfoBuilder<'_> {
        MockRepoInfoBuilder {
            server: self.server,
            owner: self.owner,
            repo: self.repo,
            is_private: false,
            default_branch: "main",
        }
    }

    /// Create a pull request mock builder.
    pub fn pull_request(&self, number: u64) -> MockPullRequestBuilder<'_> {
        MockPullRequestBuilder {
            server: self.server,
            owner: self.owner,
            repo: self.repo,
            number,
            head: "feature",
        }
    }

    /// Mock GET /repos/{owner}/{repo}/pulls returning empty list (no existing PRs).
    pub async fn list_pull_requests_empty(&self) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/{}/pulls", self.owner, self.repo)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/pulls returning a PR for specific branch.
    pub async fn list_pull_requests_with(&self, number: u64, head: &str) {
        let owner = self.owner;
        let repo = self.repo;
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner}/{repo}/pulls")))
            .and(query_param("head", format!("{owner}:{head}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([mock_pull_request(owner, repo, number, head)])),
            )
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/issues listing `(number, is_pr)`
    /// entries, newest first.
    pub async fn list_issues(&self, items: &[(u64, bool)]) {
        let owner = self.owner;
        let repo = self.repo;
        let body: Vec<serde_json::Value> = items
            .iter()
            .map(|&(n, is_pr)| mock_issue(owner, repo, n, "Listed", None, "testuser", is_pr))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner}/{repo}/issues")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking issue endpoints.
pub struct MockIssueBuilder<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
    number: u64,
    title: &'a str,
    body: Option<&'a str>,
    author: &'a str,
    is_pull_request: bool,
}

impl<'a> MockIssueBuilder<'a> {
    /// Set the issue title.
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Set the issue body.
    pub fn body(mut self, body: &'a str) -> Self {
        self.body = Some(body);
        self
    }

    /// Respond with a null body.
    pub fn no_body(mut self) -> Self {
        self.body = None;
        self
    }

    pub fn author(mut self, author: &'a str) -> Self {
        self.author = author;
        self
    }

    /// Mark the item as a pull request.
    pub fn pull_request(mut self, is_pull_request: bool) -> Self {
        self.is_pull_request = is_pull_request;
        self
    }

    fn json(&self) -> serde_json::Value {
        mock_issue(
            self.owner,
            self.repo,
            self.number,
            self.title,
            self.body,
            self.author,
            self.is_pull_request,
        )
    }

    /// Mount mock for GET /repos/{owner}/{repo}/issues/{number}.
    pub async fn get(self) {
        let route = format!("/repos/{}/{}/issues/{}", self.owner, self.repo, self.number);
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }

    /// Mount mock for GET /repos/{owner}/{repo}/issues/{number} returning 404.
    pub async fn get_not_found(self) {
        let route = format!("/repos/{}/{}/issues/{}", self.owner, self.repo, self.number);
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(self.server)
            .await;
    }

    /// Mount mock for PATCH /repos/{owner}/{repo}/issues/{number}.
    pub async fn update(self) {
        let route = format!("/repos/{}/{}/issues/{}", self.owner, self.repo, self.number);
        Mock::given(method("PATCH"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }

    /// Mount mock for POST /repos/{owner}/{repo}/issues (create new issue).
    pub async fn create(self) {
        let route = format!("/repos/{}/{}/issues", self.owner, self.repo);
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(201).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }

    /// Mount mock for GET /repos/{owner}/{repo}/issues/{number}/comments.
    pub async fn comments(self, comments: &[MockComment<'_>]) {
        let owner = self.owner;
        let repo = self.repo;
        let number = self.number;
        let body: Vec<serde_json::Value> = comments
            .iter()
            .map(|c| mock_comment(owner, repo, number, c))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner}/{repo}/issues/{number}/comments")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(self.server)
            .await;
    }

    /// Mount mock for POST /repos/{owner}/{repo}/issues/{number}/comments,
    /// answering with a comment of the given id and author.
    pub async fn create_comment(self, id: u64, author: &str) {
        let owner = self.owner;
        let repo = self.repo;
        let number = self.number;
        let comment = MockComment::new(id, author, "New comment");
        Mock::given(method("POST"))
            .and(path(format!("/repos/{owner}/{repo}/issues/{number}/comments")))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(mock_comment(owner, repo, number, &comment)),
            )
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking comment update endpoints.
pub struct MockCommentBuilder<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
}

impl<'a> MockCommentBuilder<'a> {
    /// Mount mock for PATCH /repos/{owner}/{repo}/issues/comments/{id}.
    pub async fn update(self) {
        let owner = self.owner;
        let repo = self.repo;
        let comment = MockComment::new(12345, "testuser", "Updated comment");
        Mock::given(method("PATCH"))
            .and(path_regex(format!(
                r"/repos/{owner}/{repo}/issues/comments/\d+"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(mock_comment(owner, repo, 1, &comment)),
            )
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking repository info endpoints.
pub struct MockRepoInfoBuilder<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
    is_private: bool,
    default_branch: &'a str,
}

impl<'a> MockRepoInfoBuilder<'a> {
    /// Set whether the repository is private.
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Set the default branch.
    pub fn default_branch(mut self, branch: &'a str) -> Self {
        self.default_branch = branch;
        self
    }

    /// Mount mock for GET /repos/{owner}/{repo}.
    pub async fn get(self) {
        let owner = self.owner;
        let repo = self.repo;
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner}/{repo}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_repository(
                owner,
                repo,
                self.is_private,
                self.default_branch,
            )))
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking pull request endpoints.
pub struct MockPullRequestBuilder<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
    number: u64,
    head: &'a str,
}

impl<'a> MockPullRequestBuilder<'a> {
    pub fn head(mut self, head: &'a str) -> Self {
        self.head = head;
        self
    }

    /// Mount mock for POST /repos/{owner}/{repo}/pulls.
    pub async fn create(self) {
        let owner = self.owner;
        let repo = self.repo;
        Mock::given(method("POST"))
            .and(path(format!("/repos/{owner}/{repo}/pulls")))
            .respond_with(ResponseTemplate::new(201).set_body_json(mock_pull_request(
                owner,
                repo,
                self.number,
                self.head,
            )))
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking gist endpoints.
pub struct MockGistBuilder<'a> {
    server: &'a MockServer,
    id: &'a str,
    owner: &'a str,
    files: Vec<&'a str>,
    version: &'a str,
}

impl<'a> MockGistBuilder<'a> {
    pub fn owner(mut self, owner: &'a str) -> Self {
        self.owner = owner;
        self
    }

    /// Set the single file the gist holds.
    pub fn file(mut self, name: &'a str) -> Self {
        self.files = vec![name];
        self
    }

    /// Set the latest revision id.
    pub fn version(mut self, version: &'a str) -> Self {
        self.version = version;
        self
    }

    fn json(&self) -> serde_json::Value {
        mock_gist(self.id, self.owner, &self.files, self.version)
    }

    /// Mount mock for POST /gists.
    pub async fn create(self) {
        Mock::given(method("POST"))
            .and(path("/gists"))
            .respond_with(ResponseTemplate::new(201).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }

    /// Mount mock for GET /gists/{id}.
    pub async fn get(self) {
        Mock::given(method("GET"))
            .and(path(format!("/gists/{}", self.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }

    /// Mount mock for PATCH /gists/{id}.
    pub async fn update(self) {
        Mock::given(method("PATCH"))
            .and(path(format!("/gists/{}", self.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.json()))
            .mount(self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::github::{IssueClient, RepoClient};

    #[tokio::test]
    async fn mock_server_returns_repository_info() {
        let mock = GitHubMockServer::start().await;
        mock.repo("owner", "repo").repo_info().get().await;

        let client = mock.client();
        let is_private = client.is_repo_private("owner", "repo").await.unwrap();
        assert!(!is_private);
    }

    #[tokio::test]
    async fn mock_server_records_requests() {
        let mock = GitHubMockServer::start().await;
        mock.repo("owner", "repo").issue(4).update().await;

        mock.client()
            .update_item("owner", "repo", 4, "T", "B")
            .await
            .unwrap();

        let requests = mock.requests("PATCH", "/repos/owner/repo/issues/4").await;
        assert_eq!(requests.len(), 1);
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["title"], "T");
        assert_eq!(sent["body"], "B");
    }
}
