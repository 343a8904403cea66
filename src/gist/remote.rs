//! Discovery of the git remote that mirrors an item to its gist.

use git2::Repository;
use tracing::debug;

use super::footer::{gist_id_from_url, is_gist_url};
use crate::infra::git::{list_remotes, remote_url};
use crate::item::ItemConfig;

/// Remote name used when nothing else is configured.
pub const DEFAULT_GIST_REMOTE: &str = "g";

pub fn gist_remote_url(id: &str) -> String {
    format!("https://gist.github.com/{id}.git")
}

/// Name of the gist remote.
///
/// `pr.gist-remote` wins. Otherwise the only gist remote, `default_remote`
/// among several gist remotes, the first gist remote, and finally
/// `default_remote` if it exists at all.
pub fn find_gist_remote(repo: &Repository, default_remote: &str) -> Option<String> {
    if let Some(configured) = ItemConfig::load(repo).gist_remote {
        return Some(configured);
    }

    let remotes = list_remotes(repo).ok()?;
    let gist_remotes: Vec<&str> = remotes
        .iter()
        .filter(|(_, url)| is_gist_url(url))
        .map(|(name, _)| name.as_str())
        .collect();

    let found = match gist_remotes.as_slice() {
        [only] => Some(only.to_string()),
        several if several.contains(&default_remote) => Some(default_remote.to_string()),
        [first, ..] => Some(first.to_string()),
        [] => remotes
            .iter()
            .any(|(name, _)| name == default_remote)
            .then(|| default_remote.to_string()),
    };
    debug!(?found, "gist remote");
    found
}

/// Gist id from the URL of the gist remote.
pub fn gist_id_from_remotes(repo: &Repository, default_remote: &str) -> Option<String> {
    let remote = find_gist_remote(repo, default_remote)?;
    gist_id_from_url(&remote_url(repo, &remote)?)
}

/// `pr.gist`, else the id in the gist remote's URL.
pub fn resolve_gist_id(repo: &Repository, default_remote: &str) -> Option<String> {
    ItemConfig::load(repo)
        .gist
        .or_else(|| gist_id_from_remotes(repo, default_remote))
}
