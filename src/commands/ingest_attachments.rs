//! `ghpr ingest-attachments`: move `user-attachments` images into the gist.

use std::fs;

use anyhow::anyhow;
use clap::Args;
use git2::Repository;
use tracing::{debug, info};

use super::common::Workspace;
use crate::gist::attachments::{
    AttachmentRef, find_attachment_refs, raw_permalink, replace_refs, sniff_extension,
};
use crate::gist::sync::ensure_gist_remote;
use crate::infra::git::{
    branch_exists, branch_from_remote, commit_files_to_branch, commit_paths, fetch, open_repo_at,
    push, set_upstream, workdir,
};
use crate::infra::github::{GistClient, OctocrabClient};
use crate::item::config::{GIST, NUMBER};
use crate::item::description::find_description_file;
use crate::item::{ItemConfig, ItemError};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct IngestAttachmentsArgs {
    /// Gist branch for attachments (default: $GHPR_INGEST_BRANCH, config, or "attachments")
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Skip ingestion
    #[arg(long)]
    pub no_ingest: bool,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub async fn run(args: &IngestAttachmentsArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    if args.no_ingest || ws.env.ingest_attachments == Some(false) {
        eprintln!("Attachment ingestion disabled");
        return Ok(());
    }
    let client = OctocrabClient::get()?;
    let repo = open_repo_at(&ws.cwd)?;
    let branch = resolve_branch(args.branch.as_deref(), &ws);
    ingest(client, &repo, &branch, args.dry_run, ws.gist_remote()).await?;
    Ok(())
}

/// Flag, then `GHPR_INGEST_BRANCH`, then `attachments.branch`.
pub fn resolve_branch(flag: Option<&str>, ws: &Workspace) -> String {
    flag.map(str::to_string)
        .or_else(|| ws.env.ingest_branch.clone())
        .unwrap_or_else(|| ws.config.attachments.branch.clone())
}

/// Replace the description's attachment links with gist permalinks.
///
/// Returns the number of references rewritten.
pub(crate) async fn ingest(
    client: &OctocrabClient,
    repo: &Repository,
    branch: &str,
    dry_run: bool,
    default_remote: &str,
) -> anyhow::Result<usize> {
    let config = ItemConfig::load(repo);
    let item = config.item().ok_or(ItemError::MissingConfig(NUMBER))?;
    let gist_id = config.gist.ok_or(ItemError::MissingConfig(GIST))?;
    debug!(%item, %gist_id, "ingesting attachments");
    let dir = workdir(repo)?;
    let filename =
        find_description_file(&dir)?.ok_or_else(|| ItemError::DescriptionNotFound(dir.clone()))?;
    let content = fs::read_to_string(dir.join(&filename))?;

    let refs = find_attachment_refs(&content);
    if refs.is_empty() {
        eprintln!("No user-attachments found in reference-style links");
        return Ok(0);
    }
    eprintln!("Found {} user-attachment(s) to process", refs.len());

    if dry_run {
        if !branch_exists(repo, branch) {
            eprintln!("[DRY-RUN] Would create branch '{branch}'");
        }
        for reference in &refs {
            eprintln!("[DRY-RUN] Would download: {} from {}", reference.name, reference.url);
        }
        eprintln!("[DRY-RUN] Would update {} reference(s)", refs.len());
        return Ok(0);
    }

    let owner = client
        .get_gist(&gist_id)
        .await?
        .owner
        .map(|o| o.login)
        .ok_or_else(|| anyhow!("Could not determine the owner of gist {gist_id}"))?;

    let mut downloads = Vec::with_capacity(refs.len());
    for reference in refs {
        eprintln!("Downloading: {} from {}", reference.name, reference.url);
        match client.download(&reference.url).await {
            Ok(data) => downloads.push((reference, data)),
            Err(e) => eprintln!("Warning: Failed to download {}: {e:#}", reference.url),
        }
    }
    if downloads.is_empty() {
        eprintln!("No attachments were downloaded");
        return Ok(0);
    }

    let remote = ensure_gist_remote(repo, &gist_id, default_remote)?;
    if let Err(e) = fetch(repo, &remote) {
        debug!(error = %e, "could not fetch gist before ingesting");
    }
    let replacements = store_attachments(repo, branch, &owner, &gist_id, downloads)?;

    eprintln!("Pushing {branch} branch to gist...");
    push(repo, &remote, &[format!("refs/heads/{branch}:refs/heads/{branch}")])?;
    if let Err(e) = set_upstream(repo, branch, &remote) {
        debug!(error = %e, "could not set upstream for {branch}");
    }

    fs::write(dir.join(&filename), replace_refs(&content, &replacements))?;
    commit_paths(
        repo,
        &[&filename],
        &[],
        &format!(
            "Replace user-attachments with gist permalinks\n\nConverted {} attachment(s) to gist permalinks",
            replacements.len()
        ),
    )?;
    eprintln!("Updated {} reference(s) in {filename}", replacements.len());
    eprintln!("Run 'ghpr push' to update the description on GitHub");
    info!(count = replacements.len(), branch, "ingested attachments");
    Ok(replacements.len())
}

/// Commit each download to `branch` as `{asset_id}{ext}` and pair its
/// reference with the blob's raw permalink.
fn store_attachments(
    repo: &Repository,
    branch: &str,
    owner: &str,
    gist_id: &str,
    downloads: Vec<(AttachmentRef, Vec<u8>)>,
) -> anyhow::Result<Vec<(AttachmentRef, String)>> {
    if let Some(remote) = ItemConfig::load(repo).gist_remote {
        branch_from_remote(repo, branch, &remote)?;
    }
    let mut replacements = Vec::with_capacity(downloads.len());
    for (reference, data) in downloads {
        let file = format!("{}{}", reference.asset_id, sniff_extension(&data));
        let message = format!("Add {}: {file}", reference.name);
        let Some(committed) = commit_files_to_branch(repo, branch, &[(file, data)], &message)?.pop()
        else {
            continue;
        };
        eprintln!("Saved as: {}", committed.name);
        let url = raw_permalink(owner, gist_id, &committed.blob.to_string(), &committed.name);
        replacements.push((reference, url));
    }
    Ok(replacements)
}
