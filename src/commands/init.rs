//! `ghpr init`: start a new PR or issue draft in `gh/new/`.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use git2::Repository;
use tracing::info;

use super::common::Workspace;
use crate::gist::sync::push_main_to_gist;
use crate::infra::git::{commit_paths, init_repo, set_config};
use crate::infra::github::{GistClient, OctocrabClient, RepoClient};
use crate::item::config::{BASE, GIST, OWNER, REPO};
use crate::item::description::DRAFT_DESCRIPTION;
use crate::item::locate::resolve_owner_repo;

/// Directory of a draft, relative to the project root.
pub const DRAFT_DIR: &str = "gh/new";

const TEMPLATE: &str = "# Title\n\nDescription of the PR...\n";

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct InitArgs {
    /// Repository (owner/repo, default: the current repository's GitHub remote)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Base branch for the PR (default: the repository's default branch)
    #[arg(short, long)]
    pub base: Option<String>,
}

pub async fn run(args: &InitArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    let client = OctocrabClient::get()?;
    run_with_client(args, client, &ws).await?;
    Ok(())
}

/// Create the draft and return its directory.
pub(crate) async fn run_with_client(
    args: &InitArgs,
    client: &OctocrabClient,
    ws: &Workspace,
) -> anyhow::Result<PathBuf> {
    let dir = ws.cwd.join(DRAFT_DIR);
    if dir.join(DRAFT_DESCRIPTION).exists() {
        anyhow::bail!(
            "{}/{DRAFT_DESCRIPTION} already exists. Edit it and run 'ghpr create'",
            DRAFT_DIR
        );
    }
    let owner_repo = resolve_owner_repo(args.repo.as_deref(), &ws.cwd)?;

    let existed = dir.exists();
    let repo = init_repo(&dir)?;
    if !existed {
        eprintln!("Created {DRAFT_DIR}/");
    }
    if let Some((owner, name)) = &owner_repo {
        set_config(&repo, OWNER, owner)?;
        set_config(&repo, REPO, name)?;
        eprintln!("Repository: {owner}/{name}");
    }
    if let Some(base) = &args.base {
        set_config(&repo, BASE, base)?;
        eprintln!("Base branch: {base}");
    }

    fs::write(dir.join(DRAFT_DESCRIPTION), TEMPLATE)?;
    commit_paths(&repo, &[DRAFT_DESCRIPTION], &[], "Initial PR draft")?;
    eprintln!("Created {DRAFT_DESCRIPTION} template");
    info!(dir = %dir.display(), "initialized draft");

    if let Err(e) = create_draft_gist(client, &repo, owner_repo.as_ref(), ws.gist_remote()).await {
        eprintln!("Warning: Could not create gist mirror: {e:#}");
        eprintln!("You can add it later with 'ghpr push -g'");
    }

    eprintln!();
    eprintln!("Next steps:");
    eprintln!("  1. cd {DRAFT_DIR}");
    eprintln!("  2. Edit {DRAFT_DESCRIPTION} (first line is the title)");
    eprintln!("  3. git commit -am 'Draft description'");
    eprintln!("  4. ghpr create");
    Ok(dir)
}

/// Mirror the draft to a gist matching the repository's visibility (secret
/// when unknown).
async fn create_draft_gist(
    client: &OctocrabClient,
    repo: &Repository,
    owner_repo: Option<&(String, String)>,
    default_remote: &str,
) -> anyhow::Result<()> {
    let private = match owner_repo {
        Some((owner, name)) => client.is_repo_private(owner, name).await.unwrap_or(true),
        None => true,
    };
    let description = match owner_repo {
        Some((owner, name)) => format!("Draft PR for {owner}/{name}"),
        None => "Draft PR".to_string(),
    };
    let gist = client
        .create_gist(&description, DRAFT_DESCRIPTION, TEMPLATE, !private)
        .await?;
    set_config(repo, GIST, &gist.id)?;
    eprintln!("Created gist: {}", gist.html_url);
    push_main_to_gist(repo, &gist.id, default_remote)?;
    Ok(())
}
