//! Gist operations.
//!
//! Gists are read and written through octocrab's raw routes with our own
//! request/response types, which keeps the payloads to the fields we use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::OctocrabClient;
use super::error::{GitHubError, Result};

/// A gist as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    pub id: String,
    pub html_url: String,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub history: Vec<GistRevision>,
    #[serde(default)]
    pub owner: Option<GistOwner>,
}

impl Gist {
    /// Latest revision id, if GitHub reported history.
    pub fn latest_revision(&self) -> Option<&str> {
        self.history.first().map(|h| h.version.as_str())
    }

    /// Name of the first Markdown file in the gist.
    pub fn markdown_file(&self) -> Option<&str> {
        self.files
            .keys()
            .map(String::as_str)
            .find(|name| name.ends_with(".md"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistRevision {
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistOwner {
    pub login: String,
}

#[derive(Debug, Serialize)]
struct CreateGistRequest<'a> {
    description: &'a str,
    public: bool,
    files: BTreeMap<&'a str, FileContent<'a>>,
}

#[derive(Debug, Serialize)]
struct FileContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct EditGistRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    files: BTreeMap<&'a str, RenameFile<'a>>,
}

#[derive(Debug, Serialize)]
struct RenameFile<'a> {
    filename: &'a str,
}

/// Trait for gist operations.
#[async_trait::async_trait]
pub trait GistClient: Send + Sync {
    /// Create a gist holding a single file.
    async fn create_gist(
        &self,
        description: &str,
        filename: &str,
        content: &str,
        public: bool,
    ) -> Result<Gist>;

    async fn get_gist(&self, id: &str) -> Result<Gist>;

    /// Set the description and optionally rename one file.
    async fn edit_gist(
        &self,
        id: &str,
        description: &str,
        rename: Option<(&str, &str)>,
    ) -> Result<Gist>;
}

#[async_trait::async_trait]
impl GistClient for OctocrabClient {
    async fn create_gist(
        &self,
        description: &str,
        filename: &str,
        content: &str,
        public: bool,
    ) -> Result<Gist> {
        debug!(filename, public, "creating gist");
        let request = CreateGistRequest {
            description,
            public,
            files: BTreeMap::from([(filename, FileContent { content })]),
        };
        let gist: Gist = self
            .client
            .post("/gists", Some(&request))
            .await
            .map_err(GitHubError::from)?;
        Ok(gist)
    }

    async fn get_gist(&self, id: &str) -> Result<Gist> {
        let gist: Gist = self
            .client
            .get(format!("/gists/{id}"), None::<&()>)
            .await
            .map_err(GitHubError::from)?;
        Ok(gist)
    }

    async fn edit_gist(
        &self,
        id: &str,
        description: &str,
        rename: Option<(&str, &str)>,
    ) -> Result<Gist> {
        debug!(id, ?rename, "editing gist");
        let files = rename
            .map(|(old, new)| BTreeMap::from([(old, RenameFile { filename: new })]))
            .unwrap_or_default();
        let request = EditGistRequest {
            description: Some(description),
            files,
        };
        let gist: Gist = self
            .client
            .patch(format!("/gists/{id}"), Some(&request))
            .await
            .map_err(GitHubError::from)?;
        Ok(gist)
    }
}
