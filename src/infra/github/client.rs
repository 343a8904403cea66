//! GitHub API client implementation using octocrab.

use std::process::Command;
use std::sync::OnceLock;

use anyhow::Context;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::debug;

use super::error::{GitHubError, Result};

/// Production implementation using octocrab.
///
/// Binary downloads (user attachments) go through `reqwest` with the same
/// token, since they are served outside the REST API.
pub struct OctocrabClient {
    pub(crate) client: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
}

/// Global singleton instance of OctocrabClient, initialized lazily.
///
/// Stores the `Result` of initialization. Using a single `OnceLock` for the result
/// ensures initialization logic runs only once, even across multiple threads.
static OCTOCRAB_CLIENT: OnceLock<std::result::Result<OctocrabClient, String>> = OnceLock::new();

impl OctocrabClient {
    /// Create a new OctocrabClient instance.
    /// Prefer using `OctocrabClient::get()` to reuse the singleton instance.
    fn new() -> Result<Self> {
        let token = gh_token()?;
        let client = octocrab::Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .context("Failed to build octocrab client")?;
        Self::from_parts(client, token)
    }

    /// Client pointed at another API root (a mock server in tests).
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        let client = octocrab::Octocrab::builder()
            .base_uri(base_url)
            .context("Invalid GitHub API base URL")?
            .personal_token(token.to_string())
            .build()
            .context("Failed to build octocrab client")?;
        Self::from_parts(client, token.to_string())
    }

    fn from_parts(client: octocrab::Octocrab, token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            http,
            token,
        })
    }

    /// Get the singleton instance of OctocrabClient.
    /// Initializes the client on first call (runs `gh auth token` once).
    pub fn get() -> Result<&'static Self> {
        // get_or_init ensures the closure is only run once across all threads
        OCTOCRAB_CLIENT
            .get_or_init(|| Self::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| GitHubError::TokenError(e.clone()).into())
    }

    /// Download a file that needs GitHub authentication (e.g. a
    /// `user-attachments` asset). Redirects to the storage backend are
    /// followed.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "downloading");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(USER_AGENT, "ghpr")
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(GitHubError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        let bytes = response.bytes().await.map_err(GitHubError::from)?;
        Ok(bytes.to_vec())
    }
}

/// Get GitHub token from `gh auth token` command.
/// This reuses the authentication from GitHub CLI.
pub fn gh_token() -> Result<String> {
    let output = match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GitHubError::TokenError(
                "gh CLI not found in PATH; install it and run `gh auth login`".to_string(),
            )
            .into());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to run gh auth token")),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitHubError::TokenError(format!("gh auth token failed: {stderr}")).into());
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(
            GitHubError::TokenError("gh auth token returned empty token".to_string()).into(),
        );
    }

    Ok(token)
}
