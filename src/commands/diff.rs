//! `ghpr diff`: compare the committed clone with GitHub.

use std::collections::{HashMap, HashSet};
use std::fs;

use clap::Args;
use crossterm::style::Color;
use git2::Repository;

use super::common::{ItemClone, Workspace, preview_lines};
use crate::gist::footer::extract_gist_footer;
use crate::infra::git::workdir;
use crate::infra::github::{CommentClient, IssueClient, OctocrabClient, RemoteComment};
use crate::item::comment::{comment_id_from_filename, head_drafts, list_comment_files, parse_comment};
use crate::item::description::{description_filename, read_description_from_head, split_title_body};
use crate::item::locate::resolve_kind;
use crate::item::{ItemError, ItemRef};
use crate::shared::diff::{ColorMode, colored, print_unified_diff};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct DiffArgs {
    /// When to color the output
    #[arg(short, long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Do not compare comments
    #[arg(long)]
    pub no_comments: bool,
}

/// What differed, for callers that need more than the printout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub title_changed: bool,
    pub body_changed: bool,
    pub drafts: usize,
    pub changed_comments: usize,
}

pub async fn run(args: &DiffArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let clone = ItemClone::open(&ws)?;
    let client = OctocrabClient::get()?;
    run_with_client(args, client, &clone).await?;
    Ok(())
}

pub(crate) async fn run_with_client(
    args: &DiffArgs,
    client: &OctocrabClient,
    clone: &ItemClone,
) -> anyhow::Result<DiffSummary> {
    let ItemClone { repo, item } = clone;
    let use_color = args.color.use_color();
    let kind = resolve_kind(Some(repo), client, item).await?;
    let label = kind.label();

    let description = read_description_from_head(repo)?.ok_or_else(|| {
        ItemError::DescriptionNotCommitted(description_filename(&item.repo, item.number))
    })?;
    let (title, body) = split_title_body(&description.content);
    eprintln!("Fetching {label} {item}...");
    let remote = client
        .get_item(&item.owner, &item.repo, item.number)
        .await?;
    let (local_body, remote_body) = comparable_bodies(&body, &remote.body);

    let mut summary = DiffSummary {
        title_changed: title != remote.title,
        body_changed: local_body != remote_body,
        ..DiffSummary::default()
    };

    if summary.title_changed {
        println!("{}", colored("\n=== Title Differences ===", Color::Yellow, use_color));
        println!("{}", colored(&format!("Local:  {title}"), Color::Green, use_color));
        println!(
            "{}",
            colored(&format!("Remote: {}", remote.title), Color::Red, use_color)
        );
    } else {
        println!("\n=== Title: No differences ===");
    }

    if summary.body_changed {
        println!("{}", colored("\n=== Body Differences ===", Color::Yellow, use_color));
        print_unified_diff(
            &remote_body,
            &local_body,
            &format!("Remote {label}"),
            &format!("Local {}", description.filename),
            use_color,
        )?;
    } else {
        println!("\n=== Body: No differences ===");
    }

    if !args.no_comments {
        let (drafts, changed) = render_comment_diff(client, repo, item, use_color).await?;
        summary.drafts = drafts;
        summary.changed_comments = changed;
    }
    Ok(summary)
}

/// Local and remote bodies with gist footers removed and the remote
/// right-trimmed the way the local body already is.
pub(crate) fn comparable_bodies(local: &str, remote: &str) -> (String, String) {
    let (local, _) = extract_gist_footer(local);
    let (remote, _) = extract_gist_footer(remote.trim_end());
    (local, remote)
}

/// Print committed drafts and differences between `z*.md` files and the
/// remote comments. Returns `(drafts, changed comments)`.
pub(crate) async fn render_comment_diff(
    client: &OctocrabClient,
    repo: &Repository,
    item: &ItemRef,
    use_color: bool,
) -> anyhow::Result<(usize, usize)> {
    let drafts: Vec<_> = head_drafts(repo)?
        .into_iter()
        .filter(|d| !d.content.trim().is_empty())
        .collect();
    if !drafts.is_empty() {
        println!("{}", colored("\n=== Draft comments to post ===", Color::Cyan, use_color));
        for draft in &drafts {
            println!("\nNew comment from {}:", draft.filename);
            let (lines, hidden) = preview_lines(&draft.content, 10);
            for line in lines {
                println!("{}", colored(line, Color::Green, use_color));
            }
            if hidden > 0 {
                println!("... ({hidden} more lines)");
            }
        }
    }

    let dir = workdir(repo)?;
    let files = list_comment_files(&dir)?;
    if files.is_empty() {
        return Ok((drafts.len(), 0));
    }

    let remote = client
        .get_comments(&item.owner, &item.repo, item.number)
        .await?;
    let by_id: HashMap<u64, &RemoteComment> = remote.iter().map(|c| (c.id, c)).collect();
    let mut local_ids = HashSet::new();
    let mut changed = 0;

    for file in &files {
        let Some(id) = comment_id_from_filename(file) else {
            continue;
        };
        local_ids.insert(id);
        let parsed = parse_comment(&fs::read_to_string(dir.join(file))?);
        let author = parsed.author.as_deref().unwrap_or("unknown");
        match by_id.get(&id) {
            Some(current) if current.body != parsed.body => {
                changed += 1;
                println!(
                    "{}",
                    colored(
                        &format!("\nComment {id} (by {author}) - Differences:"),
                        Color::Yellow,
                        use_color
                    )
                );
                print_unified_diff(&current.body, &parsed.body, "Remote", file, use_color)?;
            }
            Some(_) => println!("Comment {id} (by {author}): No differences"),
            None => println!("Comment {id} exists locally but not remotely"),
        }
    }
    for comment in remote.iter().filter(|c| !local_ids.contains(&c.id)) {
        println!(
            "Comment {} (by {}) exists remotely but not locally",
            comment.id, comment.author
        );
    }
    Ok((drafts.len(), changed))
}
