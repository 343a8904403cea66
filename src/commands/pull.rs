//! `ghpr pull`: bring the clone up to date with GitHub, then push it back.

use std::collections::HashMap;
use std::fs;

use clap::Args;
use git2::Repository;
use tracing::info;

use super::common::{ItemClone, Workspace};
use super::push::{FooterMode, GistVisibility, PushOptions, push_item};
use crate::gist::footer::extract_gist_footer;
use crate::infra::git::{commit_paths, read_head_file, workdir};
use crate::infra::github::{CommentClient, IssueClient, OctocrabClient, RemoteItem};
use crate::item::comment::{
    comment_filename, comment_id_from_filename, list_comment_files, parse_comment,
    write_comment_file,
};
use crate::item::description::{description_filename, render_description};
use crate::item::{ItemKind, ItemRef};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct PullArgs {
    /// Also sync to the gist
    #[arg(short, long)]
    pub gist: bool,

    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Push back with a hidden gist footer
    #[arg(short = 'f', long, conflicts_with = "no_footer")]
    pub footer: bool,

    /// Push back without a gist footer
    #[arg(short = 'F', long)]
    pub no_footer: bool,

    /// Open the item in the browser afterwards
    #[arg(short, long)]
    pub open: bool,

    #[command(flatten)]
    pub visibility: GistVisibility,

    /// Do not sync comments
    #[arg(long)]
    pub no_comments: bool,
}

impl PullArgs {
    fn push_options(&self) -> PushOptions {
        let footer = if self.no_footer {
            FooterMode::Never
        } else if self.footer {
            FooterMode::Hidden
        } else {
            FooterMode::Auto
        };
        PushOptions {
            gist: self.gist,
            dry_run: self.dry_run,
            footer,
            open: self.open,
            images: false,
            private: self.visibility.choice(),
            comments: !self.no_comments,
            force_others: false,
        }
    }
}

pub async fn run(args: &PullArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let clone = ItemClone::open(&ws)?;
    let client = OctocrabClient::get()?;
    run_with_client(args, client, &ws, &clone).await
}

pub(crate) async fn run_with_client(
    args: &PullArgs,
    client: &OctocrabClient,
    ws: &Workspace,
    clone: &ItemClone,
) -> anyhow::Result<()> {
    let ItemClone { repo, item } = clone;
    eprintln!("Pulling latest from GitHub...");
    let remote = client
        .get_item(&item.owner, &item.repo, item.number)
        .await?;
    let kind = ItemKind::from_pull_request_flag(remote.is_pull_request);

    pull_description(repo, item, kind, &remote, args.dry_run)?;
    if !args.no_comments {
        pull_comments(client, repo, item, args.dry_run).await?;
    }

    eprintln!("Pushing to {}...", kind.label());
    push_item(client, ws, clone, &args.push_options()).await
}

/// Rewrite the description from `remote` and commit it when it changed.
/// Returns whether it changed.
fn pull_description(
    repo: &Repository,
    item: &ItemRef,
    kind: ItemKind,
    remote: &RemoteItem,
    dry_run: bool,
) -> anyhow::Result<bool> {
    let label = kind.label();
    let filename = description_filename(&item.repo, item.number);
    let (body, _) = extract_gist_footer(&remote.body);
    let content = render_description(item, &remote.title, &body, &remote.html_url);

    if read_head_file(repo, &filename)?.as_deref() == Some(content.as_str()) {
        eprintln!("No changes from {label}");
        return Ok(false);
    }
    if dry_run {
        eprintln!("[DRY-RUN] Would pull and commit changes from {label}");
        return Ok(true);
    }
    fs::write(workdir(repo)?.join(&filename), &content)?;
    commit_paths(repo, &[&filename], &[], &format!("Sync from {label} (pulled latest)"))?;
    eprintln!("Pulled and committed changes from {label}");
    info!(%item, "pulled description");
    Ok(true)
}

/// Write new and changed remote comments. Returns `(new, updated)`.
async fn pull_comments(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    dry_run: bool,
) -> anyhow::Result<(usize, usize)> {
    eprintln!("Syncing comments from remote...");
    let comments = client
        .get_comments(&item.owner, &item.repo, item.number)
        .await?;
    if comments.is_empty() {
        eprintln!("No comments found remotely");
        return Ok((0, 0));
    }

    let dir = workdir(repo)?;
    let existing: HashMap<u64, String> = list_comment_files(&dir)?
        .into_iter()
        .filter_map(|file| comment_id_from_filename(&file).map(|id| (id, file)))
        .collect();

    let mut added: Vec<String> = Vec::new();
    let mut removed: Vec<String> = Vec::new();
    let (mut new, mut updated) = (0, 0);

    for comment in &comments {
        match existing.get(&comment.id) {
            Some(file) => {
                let local = parse_comment(&fs::read_to_string(dir.join(file))?);
                if local.body == comment.body {
                    continue;
                }
                updated += 1;
                if dry_run {
                    eprintln!("[DRY-RUN] Would update comment {}", comment.id);
                    continue;
                }
                let name = write_comment_file(&dir, comment)?;
                if name != *file {
                    fs::remove_file(dir.join(file))?;
                    removed.push(file.clone());
                }
                added.push(name);
            }
            None => {
                new += 1;
                if dry_run {
                    eprintln!(
                        "[DRY-RUN] Would add {} by {}",
                        comment_filename(comment.id, &comment.author),
                        comment.author
                    );
                    continue;
                }
                added.push(write_comment_file(&dir, comment)?);
            }
        }
    }

    if new == 0 && updated == 0 {
        eprintln!("All comments are up to date");
        return Ok((0, 0));
    }
    if dry_run {
        eprintln!("[DRY-RUN] Would commit {new} new, {updated} updated comments");
        return Ok((new, updated));
    }

    let mut parts = Vec::new();
    if new > 0 {
        parts.push(format!("{new} new"));
    }
    if updated > 0 {
        parts.push(format!("{updated} updated"));
    }
    let add: Vec<&str> = added.iter().map(String::as_str).collect();
    let remove: Vec<&str> = removed.iter().map(String::as_str).collect();
    commit_paths(repo, &add, &remove, &format!("Pull comments: {}", parts.join(", ")))?;
    eprintln!("Pulled comments: {new} new, {updated} updated");
    Ok((new, updated))
}
