//! `ghpr open`: open the item or its gist in the browser.

use std::path::Path;

use anyhow::anyhow;
use clap::Args;
use lazy_regex::regex_captures;
use tracing::debug;

use super::common::{Workspace, open_in_browser};
use crate::gist::footer::gist_page_url;
use crate::gist::remote::gist_id_from_remotes;
use crate::infra::git::open_repo_at;
use crate::item::description::find_description_file;
use crate::item::locate::resolve_item;
use crate::item::{ItemConfig, ItemRef};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct OpenArgs {
    /// Open the gist instead of the item
    #[arg(short, long)]
    pub gist: bool,
}

/// Where a gist id was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistSource {
    Config(String),
    Remote(String),
}

impl GistSource {
    pub fn id(&self) -> &str {
        match self {
            Self::Config(id) | Self::Remote(id) => id,
        }
    }
}

pub fn run(args: &OpenArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    open_in_browser(&target_url(&ws, args.gist)?);
    Ok(())
}

fn target_url(ws: &Workspace, gist: bool) -> anyhow::Result<String> {
    if gist {
        let source = locate_gist(&ws.cwd, ws.gist_remote())
            .ok_or_else(|| anyhow!("No gist found for this PR"))?;
        return Ok(gist_page_url(source.id(), None));
    }
    let item = locate_item(&ws.cwd)
        .ok_or_else(|| anyhow!("No PR information found in current directory"))?;
    Ok(item_page_url(&item))
}

/// Item page; GitHub redirects `/pull/N` to `/issues/N` for issues.
pub fn item_page_url(item: &ItemRef) -> String {
    format!(
        "https://github.com/{}/{}/pull/{}",
        item.owner, item.repo, item.number
    )
}

/// The item at `cwd`, falling back to a `{repo}#{N}.md` file name with the
/// owner from `pr.owner`.
pub fn locate_item(cwd: &Path) -> Option<ItemRef> {
    match resolve_item(cwd) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!(error = %e, "falling back to the description file name");
            item_from_filename(cwd)
        }
    }
}

fn item_from_filename(cwd: &Path) -> Option<ItemRef> {
    let filename = find_description_file(cwd).ok()??;
    let (_, repo, number) = regex_captures!(r"^(.+)#(\d+)\.md$", &filename)?;
    let owner = ItemConfig::load(&open_repo_at(cwd).ok()?).owner?;
    Some(ItemRef::new(owner, repo, number.parse().ok()?))
}

/// `pr.gist`, else the id in the gist remote's URL.
pub fn locate_gist(cwd: &Path, default_remote: &str) -> Option<GistSource> {
    let repo = open_repo_at(cwd).ok()?;
    if let Some(id) = ItemConfig::load(&repo).gist {
        return Some(GistSource::Config(id));
    }
    gist_id_from_remotes(&repo, default_remote).map(GistSource::Remote)
}
