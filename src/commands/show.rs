//! `ghpr show`: print the item and gist URLs.

use anyhow::anyhow;
use clap::Args;

use super::common::Workspace;
use super::open::{GistSource, item_page_url, locate_gist, locate_item};
use crate::gist::footer::gist_page_url;

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct ShowArgs {
    /// Print only the gist URL
    #[arg(short, long)]
    pub gist: bool,
}

pub fn run(args: &ShowArgs) -> anyhow::Result<()> {
    let ws = Workspace::load()?;
    for line in show_lines(&ws, args.gist)? {
        println!("{line}");
    }
    Ok(())
}

fn show_lines(ws: &Workspace, gist_only: bool) -> anyhow::Result<Vec<String>> {
    let gist = locate_gist(&ws.cwd, ws.gist_remote());
    if gist_only {
        let gist = gist.ok_or_else(|| anyhow!("No gist found for this PR"))?;
        return Ok(vec![gist_page_url(gist.id(), None)]);
    }

    let item = locate_item(&ws.cwd)
        .ok_or_else(|| anyhow!("No PR information found in current directory"))?;
    let mut lines = vec![format!("PR: {}", item_page_url(&item))];
    match gist {
        Some(GistSource::Config(id)) => lines.push(format!("Gist: {}", gist_page_url(&id, None))),
        Some(GistSource::Remote(id)) => {
            lines.push(format!("Gist (from remote): {}", gist_page_url(&id, None)));
        }
        None => {}
    }
    Ok(lines)
}
