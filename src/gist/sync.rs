//! Mirroring an item clone to its gist.

use git2::Repository;
use tracing::{debug, info};

use super::footer::{GHPR_URL, gist_page_url};
use super::remote::{find_gist_remote, gist_remote_url};
use crate::infra::git::{
    MAIN_BRANCH, ensure_remote, fetch, force_push_branch, remote_url, set_config, set_upstream,
};
use crate::infra::github::{GistClient, OctocrabClient, RepoClient};
use crate::item::config::{GIST, GIST_REMOTE};
use crate::item::description::{description_filename, read_description_from_head};
use crate::item::{ItemConfig, ItemError, ItemKind, ItemRef};

/// Gist description, e.g. `owner/repo#1 (pr) - 2-way sync via ghpr (…)`.
pub fn gist_description(item: &ItemRef, kind: Option<ItemKind>) -> String {
    match kind {
        Some(kind) => format!(
            "{item} ({}) - 2-way sync via ghpr ({GHPR_URL})",
            kind.label().to_lowercase()
        ),
        None => format!("{item} - 2-way sync via ghpr ({GHPR_URL})"),
    }
}

/// Whether a new gist should be secret: the explicit choice, else the
/// repository's visibility.
pub async fn gist_should_be_private(
    client: &OctocrabClient,
    item: &ItemRef,
    private: Option<bool>,
) -> anyhow::Result<bool> {
    if let Some(private) = private {
        return Ok(private);
    }
    let private = client.is_repo_private(&item.owner, &item.repo).await?;
    eprintln!(
        "Repository is {}, gist will match",
        if private { "private" } else { "public" }
    );
    Ok(private)
}

/// Create a gist holding the HEAD description and store its id as `pr.gist`.
pub async fn create_item_gist(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    kind: Option<ItemKind>,
    private: Option<bool>,
) -> anyhow::Result<String> {
    let description = read_description_from_head(repo)?.ok_or_else(|| {
        ItemError::DescriptionNotCommitted(description_filename(&item.repo, item.number))
    })?;
    let private = gist_should_be_private(client, item, private).await?;

    let gist = client
        .create_gist(
            &gist_description(item, kind),
            &description_filename(&item.repo, item.number),
            &description.content,
            !private,
        )
        .await?;
    set_config(repo, GIST, &gist.id)?;
    eprintln!("Created gist: {}", gist.html_url);
    Ok(gist.id)
}

/// The gist remote's name, adding `default_remote` for `gist_id` when no
/// usable remote exists. Stored as `pr.gist-remote`.
pub fn ensure_gist_remote(
    repo: &Repository,
    gist_id: &str,
    default_remote: &str,
) -> anyhow::Result<String> {
    let remote = match find_gist_remote(repo, default_remote) {
        Some(name) if remote_url(repo, &name).is_some() => name,
        _ => {
            ensure_remote(repo, default_remote, &gist_remote_url(gist_id))?;
            default_remote.to_string()
        }
    };
    set_config(repo, GIST_REMOTE, &remote)?;
    Ok(remote)
}

/// Force-push `main` to the gist remote and track it.
pub fn push_main_to_gist(
    repo: &Repository,
    gist_id: &str,
    default_remote: &str,
) -> anyhow::Result<String> {
    let remote = ensure_gist_remote(repo, gist_id, default_remote)?;
    force_push_branch(repo, &remote, MAIN_BRANCH)?;
    if let Err(e) = set_upstream(repo, MAIN_BRANCH, &remote) {
        debug!(error = %e, "could not set upstream for main");
    }
    eprintln!("Pushed to gist remote '{remote}'");
    Ok(remote)
}

/// Point the clone at an existing gist and overwrite the gist with `main`.
pub fn attach_gist(repo: &Repository, gist_id: &str, default_remote: &str) -> anyhow::Result<()> {
    set_config(repo, GIST, gist_id)?;
    let remote = ensure_gist_remote(repo, gist_id, default_remote)?;
    fetch(repo, &remote)?;
    push_main_to_gist(repo, gist_id, default_remote)?;
    Ok(())
}

/// Refresh the gist's description and Markdown file name.
async fn update_gist_metadata(
    client: &OctocrabClient,
    item: &ItemRef,
    gist_id: &str,
) -> anyhow::Result<()> {
    let expected = description_filename(&item.repo, item.number);
    let gist = client.get_gist(gist_id).await?;
    let rename = gist
        .markdown_file()
        .filter(|name| *name != expected)
        .map(|old| (old.to_string(), expected.clone()));

    client
        .edit_gist(
            gist_id,
            &gist_description(item, None),
            rename.as_ref().map(|(old, new)| (old.as_str(), new.as_str())),
        )
        .await?;
    if let Some((old, new)) = &rename {
        eprintln!("Renamed gist file from {old} to {new}");
    }
    Ok(())
}

/// Sync the clone to its gist, creating the gist when there is none.
///
/// Returns the gist URL pinned to the latest revision.
pub async fn sync_to_gist(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    private: Option<bool>,
    default_remote: &str,
) -> anyhow::Result<String> {
    let gist_id = match ItemConfig::load(repo).gist {
        Some(id) => {
            eprintln!("Updating gist {id}...");
            update_gist_metadata(client, item, &id).await?;
            id
        }
        None => {
            eprintln!("Creating new gist...");
            create_item_gist(client, repo, item, None, private).await?
        }
    };

    push_main_to_gist(repo, &gist_id, default_remote)?;

    let gist = client.get_gist(&gist_id).await?;
    let url = gist_page_url(&gist_id, gist.latest_revision());
    info!(url, "gist synced");
    Ok(url)
}
