//! Item identity stored in the clone's git config (`pr.*` keys).

use git2::Repository;

use super::spec::{ItemKind, ItemRef};
use crate::infra::git::{get_config, set_config};

pub const OWNER: &str = "pr.owner";
pub const REPO: &str = "pr.repo";
pub const NUMBER: &str = "pr.number";
pub const URL: &str = "pr.url";
pub const TYPE: &str = "pr.type";
pub const GIST: &str = "pr.gist";
pub const GIST_REMOTE: &str = "pr.gist-remote";
pub const BASE: &str = "pr.base";

/// Snapshot of the `pr.*` keys of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub number: Option<u64>,
    pub url: Option<String>,
    pub kind: Option<ItemKind>,
    pub gist: Option<String>,
    pub gist_remote: Option<String>,
    pub base: Option<String>,
}

impl ItemConfig {
    pub fn load(repo: &Repository) -> Self {
        Self {
            owner: get_config(repo, OWNER),
            repo: get_config(repo, REPO),
            number: get_config(repo, NUMBER).and_then(|n| n.trim().parse().ok()),
            url: get_config(repo, URL),
            kind: get_config(repo, TYPE).and_then(|t| ItemKind::from_config_value(&t)),
            gist: get_config(repo, GIST),
            gist_remote: get_config(repo, GIST_REMOTE),
            base: get_config(repo, BASE),
        }
    }

    /// The item, when owner, repo and number are all set.
    pub fn item(&self) -> Option<ItemRef> {
        Some(ItemRef::new(
            self.owner.clone()?,
            self.repo.clone()?,
            self.number?,
        ))
    }

    pub fn owner_repo(&self) -> Option<(String, String)> {
        Some((self.owner.clone()?, self.repo.clone()?))
    }
}

/// Store owner, repo, number, url and type.
pub fn store_item(
    repo: &Repository,
    item: &ItemRef,
    url: &str,
    kind: ItemKind,
) -> anyhow::Result<()> {
    set_config(repo, OWNER, &item.owner)?;
    set_config(repo, REPO, &item.repo)?;
    set_config(repo, NUMBER, &item.number.to_string())?;
    set_config(repo, URL, url)?;
    set_config(repo, TYPE, kind.config_value())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::git::test_utils::TempRepo;

    #[test]
    fn store_then_load_item() {
        let temp = TempRepo::without_origin("main");
        let repo = temp.open();
        let item = ItemRef::new("owner", "repo", 8);

        store_item(&repo, &item, "https://github.com/owner/repo/issues/8", ItemKind::Issue)
            .unwrap();
        set_config(&repo, GIST, "abc").unwrap();

        let config = ItemConfig::load(&repo);
        assert_eq!(config.item(), Some(item));
        assert_eq!(config.kind, Some(ItemKind::Issue));
        assert_eq!(config.gist.as_deref(), Some("abc"));
        assert_eq!(config.base, None);
    }

    #[test]
    fn partial_config_has_no_item() {
        let temp = TempRepo::without_origin("main");
        let repo = temp.open();
        set_config(&repo, OWNER, "owner").unwrap();
        set_config(&repo, REPO, "repo").unwrap();

        let config = ItemConfig::load(&repo);
        assert_eq!(config.item(), None);
        assert_eq!(
            config.owner_repo(),
            Some(("owner".to_string(), "repo".to_string()))
        );
    }
}
