//! `ghpr push`: publish the committed description and comments to GitHub.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Args};
use git2::Repository;
use tracing::{debug, info};

use super::common::{ItemClone, Workspace, open_in_browser};
use super::diff::{comparable_bodies, render_comment_diff};
use super::upload::{is_image, upload_assets};
use crate::gist::attachments::{find_local_images, replace_local_images};
use crate::gist::footer::{add_gist_footer, gist_page_url};
use crate::gist::sync::sync_to_gist;
use crate::infra::git::{commit_paths, workdir};
use crate::infra::github::{CommentClient, IssueClient, OctocrabClient, RemoteComment, RepoClient};
use crate::item::comment::{
    comment_id_from_filename, head_drafts, list_comment_files, parse_comment, write_comment_file,
};
use crate::item::description::{description_filename, read_description_from_head, split_title_body};
use crate::item::locate::resolve_kind;
use crate::item::{ItemConfig, ItemError, ItemRef};
use crate::shared::diff::{ColorMode, eprint_unified_diff};

/// Stands in for the URL of a gist a dry-run would create.
const NEW_GIST_URL: &str = "https://gist.github.com/NEW_GIST";

/// Visibility of a gist created on the way.
#[derive(Args, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct GistVisibility {
    /// Create a secret gist
    #[arg(short = 'p', long, conflicts_with = "public")]
    pub private: bool,

    /// Create a public gist
    #[arg(short = 'P', long)]
    pub public: bool,
}

impl GistVisibility {
    /// `Some(true)` for secret, `Some(false)` for public, `None` to follow the
    /// repository.
    pub fn choice(self) -> Option<bool> {
        if self.private {
            Some(true)
        } else if self.public {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct PushArgs {
    /// Sync to the gist, creating one if needed
    #[arg(short, long)]
    pub gist: bool,

    /// Show what would be pushed without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Gist footer: -f hidden, -ff visible (implies --gist)
    #[arg(short = 'f', long, action = ArgAction::Count, conflicts_with = "no_footer")]
    pub footer: u8,

    /// Never add a gist footer
    #[arg(short = 'F', long)]
    pub no_footer: bool,

    /// Open the item in the browser afterwards
    #[arg(short, long)]
    pub open: bool,

    /// Upload images referenced by local path and link them with <img> tags
    #[arg(short, long)]
    pub images: bool,

    #[command(flatten)]
    pub visibility: GistVisibility,

    /// Do not push comments
    #[arg(long)]
    pub no_comments: bool,

    /// Also try to update comments written by other users
    #[arg(short = 'C', long)]
    pub force_others: bool,
}

/// Whether and how the gist footer is written into the item body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterMode {
    Never,
    /// Hidden footer when the clone has a gist.
    Auto,
    Hidden,
    Visible,
}

impl FooterMode {
    pub fn from_flags(level: u8, disabled: bool) -> Self {
        match (disabled, level) {
            (true, _) => Self::Never,
            (false, 0) => Self::Auto,
            (false, 1) => Self::Hidden,
            (false, _) => Self::Visible,
        }
    }
}

/// Settings for [`push_item`], shared by `push` and `pull`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PushOptions {
    pub gist: bool,
    pub dry_run: bool,
    pub footer: FooterMode,
    pub open: bool,
    pub images: bool,
    pub private: Option<bool>,
    pub comments: bool,
    pub force_others: bool,
}

impl From<&PushArgs> for PushOptions {
    fn from(args: &PushArgs) -> Self {
        Self {
            gist: args.gist,
            dry_run: args.dry_run,
            footer: FooterMode::from_flags(args.footer, args.no_footer),
            open: args.open,
            images: args.images,
            private: args.visibility.choice(),
            comments: !args.no_comments,
            force_others: args.force_others,
        }
    }
}

pub async fn run(args: &PushArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let clone = ItemClone::open(&ws)?;
    let client = OctocrabClient::get()?;
    push_item(client, &ws, &clone, &PushOptions::from(args)).await
}

pub(crate) async fn push_item(
    client: &OctocrabClient,
    ws: &Workspace,
    clone: &ItemClone,
    opts: &PushOptions,
) -> anyhow::Result<()> {
    let ItemClone { repo, item } = clone;
    let kind = resolve_kind(Some(repo), client, item).await?;
    let label = kind.label();
    let description = read_description_from_head(repo)?.ok_or_else(|| {
        ItemError::DescriptionNotCommitted(description_filename(&item.repo, item.number))
    })?;
    let (title, mut body) = split_title_body(&description.content);
    if opts.images {
        body = upload_local_images(client, ws, clone, &body, opts.dry_run).await?;
    }

    let config = ItemConfig::load(repo);
    let add_footer = match opts.footer {
        FooterMode::Never => false,
        FooterMode::Auto => config.gist.is_some(),
        FooterMode::Hidden | FooterMode::Visible => true,
    };
    let sync = opts.gist || add_footer;
    debug!(%item, sync, add_footer, "pushing");

    let gist_url = if !sync {
        None
    } else if opts.dry_run {
        eprintln!("[DRY-RUN] Would sync to gist");
        Some(match config.gist.as_deref() {
            Some(id) => gist_page_url(id, None),
            None => NEW_GIST_URL.to_string(),
        })
    } else {
        Some(sync_to_gist(client, repo, item, opts.private, ws.gist_remote()).await?)
    };

    if add_footer && let Some(url) = &gist_url {
        let visible = opts.footer == FooterMode::Visible;
        let which = if visible { "visible" } else { "hidden" };
        body = add_gist_footer(&body, url, visible);
        if opts.dry_run {
            eprintln!("[DRY-RUN] Would add {which} footer with gist URL: {url}");
        } else {
            eprintln!("Added {which} footer with gist URL: {url}");
        }
    }

    if opts.dry_run {
        preview_changes(client, item, &title, &body).await?;
        if opts.comments {
            render_comment_diff(client, repo, item, ColorMode::Auto.use_color()).await?;
        }
        return Ok(());
    }

    eprintln!("Updating {label} {item}...");
    client
        .update_item(&item.owner, &item.repo, item.number, &title, &body)
        .await?;
    eprintln!("Successfully updated {label}");
    info!(%item, "pushed description");

    if opts.open {
        open_in_browser(&config.url.unwrap_or_else(|| item.html_url(kind)));
    }

    if opts.comments {
        push_comments(client, repo, item, opts.force_others).await?;
    }
    Ok(())
}

/// Upload every `![alt](path)` image with a local path to the assets
/// branch and swap it for an `<img>` tag. Paths are relative to the clone.
async fn upload_local_images(
    client: &OctocrabClient,
    ws: &Workspace,
    clone: &ItemClone,
    body: &str,
    dry_run: bool,
) -> anyhow::Result<String> {
    let images = find_local_images(body);
    if images.is_empty() {
        return Ok(body.to_string());
    }
    eprintln!("Processing images in description...");
    if dry_run {
        for image in &images {
            eprintln!("[DRY-RUN] Would upload image: {}", image.path);
        }
        return Ok(body.to_string());
    }

    let dir = workdir(&clone.repo)?;
    let mut files = Vec::with_capacity(images.len());
    for image in &images {
        let path = dir.join(&image.path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Not a file: {}", image.path))?;
        if !is_image(&name) {
            anyhow::bail!("{} is not an image", image.path);
        }
        let data =
            fs::read(&path).with_context(|| format!("Image file not found: {}", image.path))?;
        files.push((name, data));
    }

    let uploaded = upload_assets(client, ws, clone, &ws.config.upload.branch, files).await?;
    let replacements: Vec<_> = images
        .into_iter()
        .zip(uploaded)
        .map(|(image, asset)| {
            eprintln!("Uploaded {} -> {}", image.path, asset.url);
            (image, asset.url)
        })
        .collect();
    Ok(replace_local_images(body, &replacements))
}

async fn preview_changes(
    client: &OctocrabClient,
    item: &ItemRef,
    title: &str,
    body: &str,
) -> anyhow::Result<()> {
    let remote = client
        .get_item(&item.owner, &item.repo, item.number)
        .await?;
    let (local_body, remote_body) = comparable_bodies(body, &remote.body);
    let use_color = ColorMode::Auto.use_color_on_stderr();

    eprintln!("\n=== Preview of changes (dry-run) ===\n");
    if title == remote.title {
        eprintln!("=== Title: No changes ===\n");
    } else {
        eprintln!("=== Title Changes ===");
        eprintln!("Remote: {}", remote.title);
        eprintln!("Local:  {title}\n");
    }
    if local_body == remote_body {
        eprintln!("=== Body: No changes ===\n");
    } else {
        eprintln!("=== Body Changes ===");
        eprint_unified_diff(
            &remote_body,
            &local_body,
            "Remote",
            "Local (will be pushed)",
            use_color,
        )?;
        eprintln!();
    }
    Ok(())
}

/// Post committed drafts, then update changed `z*.md` comments.
async fn push_comments(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    force_others: bool,
) -> anyhow::Result<()> {
    let dir = workdir(repo)?;
    let login = client.current_user_login().await?;
    let promoted = post_drafts(client, repo, &dir, item, &login).await?;

    let files = list_comment_files(&dir)?;
    if files.is_empty() {
        eprintln!("No comment files found");
    } else {
        let remote = client
            .get_comments(&item.owner, &item.repo, item.number)
            .await?;
        let by_id: HashMap<u64, &RemoteComment> = remote.iter().map(|c| (c.id, c)).collect();
        let (mut pushed, mut skipped) = (0, 0);

        for file in &files {
            let Some(id) = comment_id_from_filename(file) else {
                continue;
            };
            let parsed = parse_comment(&fs::read_to_string(dir.join(file))?);
            let Some(current) = by_id.get(&id) else {
                eprintln!("Warning: {file} is a new comment (ID not found remotely)");
                skipped += 1;
                continue;
            };
            if parsed.body == current.body {
                eprintln!("Skipping {file} - no changes");
                skipped += 1;
                continue;
            }
            let author = parsed.author.as_deref().unwrap_or(&current.author);
            if author != login && !force_others {
                eprintln!(
                    "Skipping {file} (author: {author}, not you). Use --force-others to try anyway."
                );
                skipped += 1;
                continue;
            }
            match client
                .update_comment(&item.owner, &item.repo, id, &parsed.body)
                .await
            {
                Ok(()) => {
                    eprintln!("Updated comment {id}");
                    pushed += 1;
                }
                Err(e) => {
                    eprintln!("Warning: Could not update comment {id}: {e:#}");
                    skipped += 1;
                }
            }
        }
        eprintln!("Comments: {pushed} pushed, {skipped} skipped");
    }

    commit_promotions(repo, &dir, &promoted)
}

/// Post every non-empty draft in HEAD. Returns `(draft, comment file)` pairs.
async fn post_drafts(
    client: &OctocrabClient,
    repo: &Repository,
    dir: &Path,
    item: &ItemRef,
    login: &str,
) -> anyhow::Result<Vec<(String, String)>> {
    let drafts = head_drafts(repo)?;
    if drafts.is_empty() {
        return Ok(Vec::new());
    }
    let names: Vec<&str> = drafts.iter().map(|d| d.filename.as_str()).collect();
    eprintln!(
        "Found {} draft comment(s) to post: {}",
        drafts.len(),
        names.join(", ")
    );

    let mut promoted = Vec::new();
    for draft in &drafts {
        if draft.content.trim().is_empty() {
            eprintln!("Warning: Skipping empty draft file: {}", draft.filename);
            continue;
        }
        eprintln!("Posting {} as new comment...", draft.filename);
        let posted = match client
            .create_comment(&item.owner, &item.repo, item.number, &draft.content)
            .await
        {
            Ok(posted) => posted,
            Err(e) => {
                eprintln!("Warning: Could not post {}: {e:#}", draft.filename);
                continue;
            }
        };
        let posted = RemoteComment {
            author: login.to_string(),
            ..posted
        };
        let name = write_comment_file(dir, &posted)?;
        eprintln!("Posted comment {}, created {name}", posted.id);
        promoted.push((draft.filename.clone(), name));
    }
    Ok(promoted)
}

/// Replace posted drafts by their comment files in one commit.
fn commit_promotions(
    repo: &Repository,
    dir: &Path,
    promoted: &[(String, String)],
) -> anyhow::Result<()> {
    if promoted.is_empty() {
        return Ok(());
    }
    for (draft, _) in promoted {
        match fs::remove_file(dir.join(draft)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
    }
    let added: Vec<&str> = promoted.iter().map(|(_, file)| file.as_str()).collect();
    let removed: Vec<&str> = promoted.iter().map(|(draft, _)| draft.as_str()).collect();
    let message = match promoted {
        [(draft, file)] => format!("Post new comment: {draft} → {file}"),
        _ => format!("Post {} new comments", promoted.len()),
    };
    commit_paths(repo, &added, &removed, &message)?;
    eprintln!("Committed {} new comment(s)", promoted.len());
    Ok(())
}
