//! GitHub API client module using octocrab.
//!
//! Provides OctocrabClient for GitHub operations,
//! with authentication via `gh auth token`.

mod client;
mod comment;
pub(crate) mod error;
mod gist;
mod issue;
#[cfg(test)]
mod mock;
mod pr;
mod repo;

pub use client::{OctocrabClient, gh_token};
pub use comment::{CommentClient, RemoteComment};
pub use gist::GistClient;
pub use issue::{IssueClient, ItemLink, RemoteItem};
#[cfg(test)]
pub use mock::{GitHubMockServer, MockComment};
pub use pr::{CreatePrParams, PrClient};
pub use repo::RepoClient;
