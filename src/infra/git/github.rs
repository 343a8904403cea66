//! GitHub-related git operations.

use git2::Repository;
use lazy_regex::regex_captures;
use tracing::debug;

use super::error::{GitError, Result};
use super::remote::list_remotes;

/// Parse owner and repo from a GitHub URL.
/// Supports both SSH (git@github.com:owner/repo.git) and HTTPS formats.
/// Gist URLs are rejected.
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    match regex_captures!(r"(?:^|[@/])github\.com[:/]([^/]+)/([^/]+?)(?:\.git)?/?$", url) {
        Some((_, owner, repo)) => Ok((owner.to_string(), repo.to_string())),
        None => Err(GitError::InvalidGitHubUrl(url.to_string()).into()),
    }
}

/// Owner and repo of the first remote that points at GitHub, trying
/// `origin`, then `upstream`, then every other remote in order.
pub fn github_remote(repo: &Repository) -> Option<(String, String)> {
    let mut remotes = list_remotes(repo).ok()?;
    remotes.sort_by_key(|(name, _)| match name.as_str() {
        "origin" => 0,
        "upstream" => 1,
        _ => 2,
    });
    remotes.into_iter().find_map(|(name, url)| {
        let parsed = parse_github_url(&url).ok()?;
        debug!(remote = %name, owner = %parsed.0, repo = %parsed.1, "found GitHub remote");
        Some(parsed)
    })
}
