//! `ghpr upload`: store local files on a gist branch and print links to them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, ValueEnum};
use git2::Repository;
use tracing::{debug, info};

use super::common::{ItemClone, Workspace};
use crate::gist::attachments::raw_permalink;
use crate::gist::sync::ensure_gist_remote;
use crate::infra::git::{branch_from_remote, commit_files_to_branch, fetch, push, set_config};
use crate::infra::github::{GistClient, OctocrabClient};
use crate::item::config::GIST;
use crate::item::{ItemConfig, ItemRef};

const ASSETS_FILENAME: &str = "assets.md";
const ASSETS_PLACEHOLDER: &str = "# PR Assets\nImage assets for PR\n";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UploadFormat {
    Url,
    Markdown,
    Img,
    /// `img` for images, `url` otherwise
    #[default]
    Auto,
}

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Gist branch to store the files on (default: config, or "assets")
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = UploadFormat::Auto)]
    pub format: UploadFormat,

    /// Alt text (default: the file name)
    #[arg(short, long)]
    pub alt: Option<String>,
}

pub async fn run(args: &UploadArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let clone = ItemClone::open(&ws)?;
    let client = OctocrabClient::get()?;
    for line in run_with_client(args, client, &ws, &clone).await? {
        println!("{line}");
    }
    Ok(())
}

/// Upload `args.files` and return one formatted link per file.
pub(crate) async fn run_with_client(
    args: &UploadArgs,
    client: &OctocrabClient,
    ws: &Workspace,
    clone: &ItemClone,
) -> anyhow::Result<Vec<String>> {
    let branch = args
        .branch
        .clone()
        .unwrap_or_else(|| ws.config.upload.branch.clone());

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let path = ws.resolve_path(path);
        let data = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Not a file: {}", path.display()))?;
        files.push((name, data));
    }

    let uploaded = upload_assets(client, ws, clone, &branch, files).await?;
    Ok(uploaded
        .iter()
        .map(|asset| {
            let alt = args.alt.as_deref().unwrap_or(&asset.name);
            format_link(args.format, &asset.name, alt, &asset.url)
        })
        .collect())
}

/// A file stored on the assets branch, with its pinned raw URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UploadedAsset {
    pub name: String,
    pub url: String,
}

/// Commit `files` onto the gist's `branch` and push it. Creates a secret
/// assets gist when the clone has none yet.
pub(crate) async fn upload_assets(
    client: &OctocrabClient,
    ws: &Workspace,
    clone: &ItemClone,
    branch: &str,
    files: Vec<(String, Vec<u8>)>,
) -> anyhow::Result<Vec<UploadedAsset>> {
    let ItemClone { repo, item } = clone;
    let gist_id = match ItemConfig::load(repo).gist {
        Some(id) => id,
        None => create_assets_gist(client, repo, item).await?,
    };
    let remote = ensure_gist_remote(repo, &gist_id, ws.gist_remote())?;
    if let Err(e) = fetch(repo, &remote) {
        debug!(error = %e, "could not fetch gist before uploading");
    }
    branch_from_remote(repo, branch, &remote)?;

    let uploads: Vec<(String, Vec<u8>)> = files
        .into_iter()
        .map(|(name, data)| (sanitize_filename(&name), data))
        .collect();
    let committed =
        commit_files_to_branch(repo, branch, &uploads, &format!("Add assets for {item}"))?;
    if committed.is_empty() {
        anyhow::bail!("No files were uploaded");
    }

    eprintln!("Pushing {branch} branch to gist...");
    push(repo, &remote, &[format!("refs/heads/{branch}:refs/heads/{branch}")])?;

    let owner = client
        .get_gist(&gist_id)
        .await?
        .owner
        .map(|o| o.login)
        .ok_or_else(|| anyhow!("Could not determine the owner of gist {gist_id}"))?;
    info!(%item, count = committed.len(), branch, "uploaded assets");

    Ok(committed
        .into_iter()
        .map(|file| UploadedAsset {
            url: raw_permalink(&owner, &gist_id, &file.blob.to_string(), &file.name),
            name: file.name,
        })
        .collect())
}

async fn create_assets_gist(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
) -> anyhow::Result<String> {
    let gist = client
        .create_gist(
            &format!("{item} assets"),
            ASSETS_FILENAME,
            ASSETS_PLACEHOLDER,
            false,
        )
        .await?;
    set_config(repo, GIST, &gist.id)?;
    eprintln!("Created gist: {}", gist.html_url);
    Ok(gist.id)
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub(crate) fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub(crate) fn format_link(format: UploadFormat, name: &str, alt: &str, url: &str) -> String {
    match format {
        UploadFormat::Url => url.to_string(),
        UploadFormat::Markdown => format!("![{alt}]({url})"),
        UploadFormat::Img => format!("<img alt=\"{alt}\" src=\"{url}\" />"),
        UploadFormat::Auto if is_image(name) => format_link(UploadFormat::Img, name, alt, url),
        UploadFormat::Auto => url.to_string(),
    }
}
