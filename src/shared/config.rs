use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;

/// Top-level configuration for ghpr.
#[derive(Debug, Default, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Settings for `ghpr clone`.
    #[serde(default)]
    pub clone: CloneConfig,

    /// Gist mirror settings.
    #[serde(default)]
    pub gist: GistConfig,

    /// Settings for ingesting GitHub user-attachments into the gist.
    #[serde(default)]
    pub attachments: AttachmentsConfig,

    /// Settings for `ghpr upload`.
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Clone configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CloneConfig {
    /// Directory template for new clones; `{number}` is replaced by the item
    /// number (default: "gh/{number}").
    #[serde(default = "default_clone_directory")]
    #[schemars(default = "default_clone_directory")]
    pub directory: String,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            directory: default_clone_directory(),
        }
    }
}

impl CloneConfig {
    /// Clone directory for item `number`.
    pub fn directory_for(&self, number: u64) -> PathBuf {
        PathBuf::from(self.directory.replace("{number}", &number.to_string()))
    }
}

/// Gist configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GistConfig {
    /// Default name of the git remote pointing at the gist (default: "g").
    #[serde(default = "default_gist_remote")]
    #[schemars(default = "default_gist_remote")]
    pub remote: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            remote: default_gist_remote(),
        }
    }
}

/// Attachment ingestion configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AttachmentsConfig {
    /// Whether `clone` ingests user-attachments (default: true).
    #[serde(default = "default_true")]
    #[schemars(default = "default_true")]
    pub ingest: bool,

    /// Gist branch that receives ingested attachments (default: "attachments").
    #[serde(default = "default_attachments_branch")]
    #[schemars(default = "default_attachments_branch")]
    pub branch: String,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            ingest: default_true(),
            branch: default_attachments_branch(),
        }
    }
}

/// Upload configuration.
#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Gist branch that receives uploaded files (default: "assets").
    #[serde(default = "default_upload_branch")]
    #[schemars(default = "default_upload_branch")]
    pub branch: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            branch: default_upload_branch(),
        }
    }
}

fn default_clone_directory() -> String {
    "gh/{number}".to_string()
}

fn default_gist_remote() -> String {
    "g".to_string()
}

fn default_true() -> bool {
    true
}

fn default_attachments_branch() -> String {
    "attachments".to_string()
}

fn default_upload_branch() -> String {
    "assets".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file (permission error, etc.)
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Load configuration from ~/.config/ghpr/config.ya?ml.
/// Returns Config::default() if no config file exists.
pub fn load_config() -> anyhow::Result<Config> {
    let Some(dir) = super::dirs::ghpr_config_dir() else {
        return Ok(Config::default());
    };
    load_config_from_dir(&dir)
}

/// Load configuration from a specific directory.
/// Searches for config.yaml, then config.yml in the given directory.
/// Returns Config::default() if neither file exists.
pub fn load_config_from_dir(dir: &Path) -> anyhow::Result<Config> {
    for filename in &["config.yaml", "config.yml"] {
        let path = dir.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => return parse_config(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ConfigError::ReadError { path, source: e }.into()),
        }
    }

    Ok(Config::default())
}

/// Parse YAML content into Config.
fn parse_config(content: &str, path: &Path) -> anyhow::Result<Config> {
    serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
        .map_err(Into::into)
}

/// Generate JSON Schema for the Config struct.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Config)
}
