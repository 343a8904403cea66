//! `ghpr create`: open the drafted item on GitHub and turn the draft into a
//! regular clone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args};
use git2::Repository;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, info};

use super::common::{Workspace, open_in_browser};
use crate::gist::remote::{find_gist_remote, gist_id_from_remotes};
use crate::infra::git::{
    MAIN_BRANCH, commit_paths, enclosing_repo, open_repo_at, pr_head_branch, push, set_config,
    workdir,
};
use crate::infra::github::{
    CreatePrParams, IssueClient, ItemLink, OctocrabClient, PrClient, RepoClient,
};
use crate::item::config::{GIST, store_item};
use crate::item::description::{DRAFT_DESCRIPTION, parse_description, write_description};
use crate::item::locate::resolve_owner_repo;
use crate::item::{ItemConfig, ItemError, ItemKind, ItemRef};

const PREVIEW_CHARS: usize = 500;
const PREVIEW_LINES: usize = 10;

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct CreateArgs {
    /// Skip the web form: -y creates via the API and opens the result, -yy
    /// creates without opening anything
    #[arg(short, long, action = ArgAction::Count)]
    pub yes: u8,

    /// Repository (owner/repo, default: auto-detected)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Show what would be created without creating it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Create an issue instead of a PR
    #[arg(short, long)]
    pub issue: bool,

    /// Head branch (default: the enclosing repository's current branch)
    #[arg(short = 'H', long)]
    pub head: Option<String>,

    /// Create a draft PR (needs -y)
    #[arg(short, long)]
    pub draft: bool,

    /// Base branch (default: pr.base, then the repository's default branch)
    #[arg(short, long)]
    pub base: Option<String>,
}

/// Branches of a PR to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Branches {
    base: String,
    head: String,
}

pub async fn run(args: &CreateArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let client = OctocrabClient::get()?;
    run_with_client(args, client, &ws).await?;
    Ok(())
}

/// Create the item. Returns the clone's final directory, or `None` when
/// nothing was created.
pub(crate) async fn run_with_client(
    args: &CreateArgs,
    client: &OctocrabClient,
    ws: &Workspace,
) -> anyhow::Result<Option<PathBuf>> {
    if args.draft && args.yes == 0 {
        anyhow::bail!("--draft requires -y (the web form cannot create draft PRs)");
    }
    let repo = open_repo_at(&ws.cwd)?;
    let dir = workdir(&repo)?;
    let content = match fs::read_to_string(dir.join(DRAFT_DESCRIPTION)) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ItemError::DescriptionNotFound(dir).into());
        }
        Err(e) => return Err(e.into()),
    };
    let (title, body) = parse_description(&content)
        .ok_or_else(|| ItemError::InvalidDescription(DRAFT_DESCRIPTION.to_string()))?;
    let (owner, name) =
        resolve_owner_repo(args.repo.as_deref(), &dir)?.ok_or(ItemError::NoRepository)?;

    let kind = if args.issue {
        ItemKind::Issue
    } else {
        ItemKind::Pr
    };
    let label = kind.label();
    let branches = match kind {
        ItemKind::Pr => Some(resolve_branches(args, &repo, client, &owner, &name).await?),
        ItemKind::Issue => None,
    };

    if args.dry_run {
        eprintln!("[DRY-RUN] Would create {label} in {owner}/{name}");
        eprintln!("  Title: {title}");
        if let Some(Branches { base, head }) = &branches {
            eprintln!("  Base: {base}");
            eprintln!("  Head: {head}");
        }
        if args.draft {
            eprintln!("  Type: Draft PR");
        }
        if !body.is_empty() {
            eprintln!("  Body ({} chars):", body.chars().count());
            for line in body_preview(&body) {
                eprintln!("    {line}");
            }
        }
        return Ok(None);
    }

    let link = if args.yes == 0 {
        let url = web_form_url(&owner, &name, &title, &body, branches.as_ref());
        open_in_browser(&url);
        eprintln!("Opened {label} in web editor");
        eprintln!("Press Enter when you've finished creating the {label} in the browser...");
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        eprintln!("Fetching {label} information...");
        let found = match &branches {
            Some(Branches { head, .. }) => client.find_pr_for_branch(&owner, &name, head).await?,
            None => client.latest_issue(&owner, &name).await?,
        };
        let Some(found) = found else {
            eprintln!("Warning: Could not find the new {label}");
            eprintln!("Run 'ghpr create' again with -y, or set pr.number by hand");
            return Ok(None);
        };
        found
    } else {
        let link = match &branches {
            Some(Branches { base, head }) => {
                client
                    .create_pull_request(CreatePrParams {
                        owner: owner.clone(),
                        repo: name.clone(),
                        title: title.clone(),
                        body: body.clone(),
                        head: head.clone(),
                        base: base.clone(),
                        draft: args.draft,
                    })
                    .await?
            }
            None => client.create_issue(&owner, &name, &title, &body).await?,
        };
        eprintln!("Created {label} #{}: {}", link.number, link.html_url);
        if args.yes == 1 {
            open_in_browser(&link.html_url);
        }
        link
    };

    let item = ItemRef::new(owner, name, link.number);
    finalize(&repo, &item, kind, &link, (&title, &body), ws.gist_remote()).map(Some)
}

async fn resolve_branches(
    args: &CreateArgs,
    repo: &Repository,
    client: &OctocrabClient,
    owner: &str,
    name: &str,
) -> anyhow::Result<Branches> {
    let base = match args.base.clone().or(ItemConfig::load(repo).base) {
        Some(base) => base,
        None => {
            let base = client.get_default_branch(owner, name).await?;
            eprintln!("Auto-detected base branch: {base}");
            base
        }
    };
    let head = match &args.head {
        Some(head) => head.clone(),
        None => {
            let outer = enclosing_repo(repo).ok_or_else(|| {
                anyhow::anyhow!("Could not detect the head branch. Use -H/--head")
            })?;
            let head = pr_head_branch(&outer)?;
            eprintln!("Auto-detected head branch: {head}");
            head
        }
    };
    Ok(Branches { base, head })
}

/// At most [`PREVIEW_CHARS`] characters (plus `...` when cut) and
/// [`PREVIEW_LINES`] lines of `body`.
fn body_preview(body: &str) -> Vec<String> {
    let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
    if body.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
        .split('\n')
        .take(PREVIEW_LINES)
        .map(str::to_string)
        .collect()
}

/// GitHub's pre-filled "new PR" (compare) or "new issue" page.
fn web_form_url(
    owner: &str,
    repo: &str,
    title: &str,
    body: &str,
    branches: Option<&Branches>,
) -> String {
    let title = utf8_percent_encode(title, NON_ALPHANUMERIC);
    let body = utf8_percent_encode(body, NON_ALPHANUMERIC);
    match branches {
        Some(Branches { base, head }) => format!(
            "https://github.com/{owner}/{repo}/compare/{base}...{head}?expand=1&title={title}&body={body}"
        ),
        None => format!("https://github.com/{owner}/{repo}/issues/new?title={title}&body={body}"),
    }
}

/// Store the item, replace `DESCRIPTION.md` by `{repo}#{N}.md`, push to the
/// gist and move `gh/new` to `gh/{N}`.
fn finalize(
    repo: &Repository,
    item: &ItemRef,
    kind: ItemKind,
    link: &ItemLink,
    (title, body): (&str, &str),
    default_remote: &str,
) -> anyhow::Result<PathBuf> {
    let label = kind.label();
    let dir = workdir(repo)?;
    store_item(repo, item, &link.html_url, kind)?;
    if let Some(id) = gist_id_from_remotes(repo, default_remote) {
        set_config(repo, GIST, &id)?;
        debug!(gist = %id, "stored gist id from remote");
    }

    let filename = write_description(&dir, item, title, body, &link.html_url)?;
    fs::remove_file(dir.join(DRAFT_DESCRIPTION))?;
    commit_paths(
        repo,
        &[&filename],
        &[DRAFT_DESCRIPTION],
        &format!("Rename to {filename} and add {label} #{} link", item.number),
    )?;
    eprintln!("Renamed {DRAFT_DESCRIPTION} to {filename}");
    info!(%item, "created");

    match find_gist_remote(repo, default_remote) {
        Some(remote) => {
            let refspec = format!("refs/heads/{MAIN_BRANCH}:refs/heads/{MAIN_BRANCH}");
            match push(repo, &remote, &[refspec]) {
                Ok(()) => eprintln!("Pushed to gist remote '{remote}'"),
                Err(e) => eprintln!("Warning: Could not push to gist: {e:#}"),
            }
        }
        None => eprintln!("No gist remote found, skipping gist push"),
    }

    Ok(rename_draft_dir(&dir, item.number))
}

/// Move `gh/{name}` to `gh/{number}` when the target is free. Returns the
/// directory the clone ends up in.
fn rename_draft_dir(dir: &Path, number: u64) -> PathBuf {
    let (Some(parent), Some(name)) = (dir.parent(), dir.file_name()) else {
        return dir.to_path_buf();
    };
    let target_name = number.to_string();
    if parent.file_name().is_none_or(|p| p != "gh") || name == target_name.as_str() {
        return dir.to_path_buf();
    }
    let target = parent.join(&target_name);
    if target.exists() {
        eprintln!(
            "Warning: {} already exists; leaving the clone in {}",
            target.display(),
            dir.display()
        );
        return dir.to_path_buf();
    }
    match fs::rename(dir, &target) {
        Ok(()) => {
            eprintln!("Renamed directory: {} → {}", dir.display(), target.display());
            eprintln!("Run: cd {}", target.display());
            target
        }
        Err(e) => {
            eprintln!("Warning: Could not rename {}: {e}", dir.display());
            dir.to_path_buf()
        }
    }
}
