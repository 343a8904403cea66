//! `ghpr clone`: mirror an issue or PR into a new local repository.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use git2::Repository;
use tracing::info;

use super::common::{Workspace, open_in_browser};
use super::ingest_attachments;
use crate::gist::attachments::find_attachment_refs;
use crate::gist::footer::{add_gist_footer, extract_gist_footer, gist_id_from_url, gist_page_url};
use crate::gist::remote::find_gist_remote;
use crate::gist::sync::{attach_gist, create_item_gist, push_main_to_gist};
use crate::infra::git::{MAIN_BRANCH, commit_paths, force_push_branch, init_repo};
use crate::infra::github::{CommentClient, IssueClient, OctocrabClient, RemoteItem, RepoClient};
use crate::item::comment::write_comment_file;
use crate::item::config::store_item;
use crate::item::description::write_description;
use crate::item::locate::{resolve_item, resolve_owner_repo};
use crate::item::{ItemError, ItemKind, ItemRef, ItemSpec};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct CloneArgs {
    /// PR/issue number, owner/repo#number or GitHub URL (default: inferred
    /// from the current directory)
    pub spec: Option<String>,

    /// Directory to clone into (default: gh/{number})
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Do not create or attach a gist
    #[arg(short = 'G', long)]
    pub no_gist: bool,

    /// Do not clone comments
    #[arg(long)]
    pub no_comments: bool,

    /// Do not open a newly created gist in the browser
    #[arg(long)]
    pub no_open: bool,
}

pub async fn run(args: &CloneArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let client = OctocrabClient::get()?;
    run_with_client(args, client, &ws).await?;
    Ok(())
}

/// The item named by `spec`, or the one the working directory belongs to.
fn resolve_target(spec: Option<&str>, ws: &Workspace) -> anyhow::Result<ItemRef> {
    let Some(spec) = spec else {
        return resolve_item(&ws.cwd);
    };
    match ItemSpec::parse(spec)? {
        ItemSpec::Qualified { item, .. } => Ok(item),
        ItemSpec::Number(number) => {
            let (owner, repo) = resolve_owner_repo(None, &ws.cwd)?
                .ok_or_else(|| ItemError::NoGitHubRemote(ws.cwd.clone()))?;
            Ok(ItemRef::new(owner, repo, number))
        }
    }
}

/// Clone the item and return the new directory.
pub(crate) async fn run_with_client(
    args: &CloneArgs,
    client: &OctocrabClient,
    ws: &Workspace,
) -> anyhow::Result<PathBuf> {
    let item = resolve_target(args.spec.as_deref(), ws)?;
    eprintln!("Fetching {item}...");
    let remote = client
        .get_item(&item.owner, &item.repo, item.number)
        .await?;
    let kind = ItemKind::from_pull_request_flag(remote.is_pull_request);
    let label = kind.label();

    let dir = match &args.directory {
        Some(dir) => ws.resolve_path(dir),
        None => ws.resolve_path(&ws.config.clone.directory_for(item.number)),
    };
    if dir.exists() {
        anyhow::bail!("Directory {} already exists", dir.display());
    }
    eprintln!("Found {label}: {}", remote.title);

    let repo = init_repo(&dir)?;
    let (body, _) = extract_gist_footer(&remote.body);
    let filename = write_description(&dir, &item, &remote.title, &body, &remote.html_url)?;
    store_item(&repo, &item, &remote.html_url, kind)?;
    commit_paths(&repo, &[&filename], &[], &format!("Initial clone of {label} {item}"))?;
    info!(%item, dir = %dir.display(), "cloned description");

    let has_gist = !args.no_gist;
    if has_gist {
        setup_gist(client, &repo, &item, kind, &remote, ws, !args.no_open).await?;
    }

    eprintln!("Successfully cloned {label} to {}", dir.display());
    eprintln!("URL: {}", remote.html_url);

    if !args.no_comments {
        clone_comments(client, &repo, &dir, &item, kind, has_gist, ws).await?;
    }

    if has_gist && wants_ingest(ws, &fs::read_to_string(dir.join(&filename))?) {
        eprintln!("Found user-attachments, ingesting...");
        let branch = ingest_attachments::resolve_branch(None, ws);
        ingest_attachments::ingest(client, &repo, &branch, false, ws.gist_remote()).await?;
    }

    Ok(dir)
}

/// Ingestion is enabled (env var, then config) and `description` links
/// user-attachments.
fn wants_ingest(ws: &Workspace, description: &str) -> bool {
    let enabled = ws
        .env
        .ingest_attachments
        .unwrap_or(ws.config.attachments.ingest);
    enabled && !find_attachment_refs(description).is_empty()
}

/// Attach the gist linked from the body footer, or create one.
///
/// A new gist gets a hidden footer on the item when the current user wrote it.
async fn setup_gist(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    kind: ItemKind,
    remote: &RemoteItem,
    ws: &Workspace,
    open_browser: bool,
) -> anyhow::Result<()> {
    let label = kind.label();
    let (_, footer_url) = extract_gist_footer(&remote.body);
    if let Some(url) = footer_url
        && let Some(id) = gist_id_from_url(&url)
    {
        eprintln!("Found existing gist in {label} description: {url}");
        attach_gist(repo, &id, ws.gist_remote())?;
        return Ok(());
    }

    eprintln!("Creating gist for {label} sync...");
    let id = create_item_gist(client, repo, item, Some(kind), None).await?;
    push_main_to_gist(repo, &id, ws.gist_remote())?;
    let gist_url = gist_page_url(&id, None);
    if open_browser {
        open_in_browser(&gist_url);
    }

    let login = client.current_user_login().await?;
    if login == remote.author {
        let body = add_gist_footer(&remote.body, &gist_url, false);
        client
            .update_item_body(&item.owner, &item.repo, item.number, &body)
            .await?;
        eprintln!("Added gist footer to {label}");
    } else {
        eprintln!(
            "Not adding a gist footer: {label} was written by {}, not {login}",
            remote.author
        );
    }
    Ok(())
}

async fn clone_comments(
    client: &OctocrabClient,
    repo: &Repository,
    dir: &Path,
    item: &ItemRef,
    kind: ItemKind,
    has_gist: bool,
    ws: &Workspace,
) -> anyhow::Result<()> {
    eprintln!("Fetching comments for {}...", kind.label());
    let comments = client
        .get_comments(&item.owner, &item.repo, item.number)
        .await?;
    if comments.is_empty() {
        eprintln!("No comments found");
        return Ok(());
    }

    let names = comments
        .iter()
        .map(|comment| write_comment_file(dir, comment))
        .collect::<Result<Vec<_>, _>>()?;
    let paths: Vec<&str> = names.iter().map(String::as_str).collect();
    commit_paths(repo, &paths, &[], &format!("Add {} comment(s)", comments.len()))?;
    eprintln!("Cloned {} comment(s)", comments.len());

    if has_gist && let Some(remote) = find_gist_remote(repo, ws.gist_remote()) {
        force_push_branch(repo, &remote, MAIN_BRANCH)?;
        eprintln!("Pushed comments to gist");
    }
    Ok(())
}
