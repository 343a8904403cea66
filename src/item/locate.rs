//! Resolve which item a directory belongs to.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use lazy_regex::regex_captures;
use tracing::debug;

use super::config::ItemConfig;
use super::description::{DRAFT_DESCRIPTION, item_from_inline_header};
use super::error::ItemError;
use super::spec::{ItemKind, ItemRef};
use crate::infra::git::{enclosing_repo, github_remote, open_repo_at};
use crate::infra::github::{IssueClient, OctocrabClient};

/// Number and project directory for an item directory layout:
/// `pr{N}`, `issue{N}`, `gh{N}`, or `gh/{N}`.
fn item_dir(cwd: &Path) -> Option<(u64, PathBuf)> {
    for dir in cwd.ancestors() {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let parent = dir.parent()?;
        if let Some((_, number)) = regex_captures!(r"^(?:pr|issue|gh)(\d+)$", name)
            && let Ok(number) = number.parse()
        {
            return Some((number, parent.to_path_buf()));
        }
        if parent.file_name().is_some_and(|n| n == "gh")
            && let Ok(number) = name.parse()
        {
            let project = parent.parent()?;
            return Some((number, project.to_path_buf()));
        }
    }
    None
}

/// The item the directory `cwd` belongs to.
///
/// Tries the `pr.*` git config, then the directory layout (with owner/repo
/// from the project's GitHub remote), then an inline-link header in
/// `DESCRIPTION.md`.
pub fn resolve_item(cwd: &Path) -> anyhow::Result<ItemRef> {
    if let Ok(repo) = open_repo_at(cwd)
        && let Some(item) = ItemConfig::load(&repo).item()
    {
        debug!(%item, "resolved item from git config");
        return Ok(item);
    }

    if let Some((number, project)) = item_dir(cwd) {
        let (owner, repo) = open_repo_at(&project)
            .ok()
            .and_then(|repo| github_remote(&repo))
            .ok_or_else(|| ItemError::NoGitHubRemote(project.clone()))?;
        debug!(owner, repo, number, "resolved item from directory layout");
        return Ok(ItemRef::new(owner, repo, number));
    }

    if let Ok(content) = fs::read_to_string(cwd.join(DRAFT_DESCRIPTION))
        && let Some(item) = item_from_inline_header(content.lines().next().unwrap_or_default())
    {
        debug!(%item, "resolved item from DESCRIPTION.md header");
        return Ok(item);
    }

    Err(ItemError::Unresolved(cwd.to_path_buf()).into())
}

/// PR or issue: `pr.type` when stored, else asked from GitHub.
pub async fn resolve_kind(
    repo: Option<&Repository>,
    client: &OctocrabClient,
    item: &ItemRef,
) -> anyhow::Result<ItemKind> {
    if let Some(kind) = repo.and_then(|r| ItemConfig::load(r).kind) {
        return Ok(kind);
    }
    let remote = client
        .get_item(&item.owner, &item.repo, item.number)
        .await?;
    Ok(ItemKind::from_pull_request_flag(remote.is_pull_request))
}

/// Split `owner/repo`.
pub fn parse_owner_repo(arg: &str) -> Result<(String, String), ItemError> {
    match arg.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ItemError::InvalidRepo(arg.to_string())),
    }
}

/// Repository for `init` and `create`: the explicit argument, the `pr.*`
/// config, then the GitHub remote of the repository at `cwd` or the one
/// enclosing it.
pub fn resolve_owner_repo(
    repo_arg: Option<&str>,
    cwd: &Path,
) -> anyhow::Result<Option<(String, String)>> {
    if let Some(arg) = repo_arg {
        return Ok(Some(parse_owner_repo(arg)?));
    }
    let Ok(repo) = open_repo_at(cwd) else {
        return Ok(None);
    };
    if let Some(pair) = ItemConfig::load(&repo).owner_repo() {
        return Ok(Some(pair));
    }
    if let Some(pair) = github_remote(&repo) {
        return Ok(Some(pair));
    }
    Ok(enclosing_repo(&repo).and_then(|outer| github_remote(&outer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::git::test_utils::TempRepo;
    use crate::infra::git::{init_repo, set_config};
    use crate::infra::github::GitHubMockServer;
    use crate::item::config::{NUMBER, OWNER, REPO, TYPE};
    use rstest::rstest;

    #[rstest]
    #[case::gh_slash("proj/gh/12", Some((12, "proj")))]
    #[case::gh_slash_nested("proj/gh/12/sub", Some((12, "proj")))]
    #[case::pr_prefix("proj/pr34", Some((34, "proj")))]
    #[case::issue_prefix("proj/issue5", Some((5, "proj")))]
    #[case::legacy_gh("proj/gh9", Some((9, "proj")))]
    #[case::unrelated("proj/src", None)]
    #[case::gh_non_numeric("proj/gh/new", None)]
    fn item_dir_layouts(#[case] rel: &str, #[case] expected: Option<(u64, &str)>) {
        let base = PathBuf::from("/work");
        let expected = expected.map(|(n, p)| (n, base.join(p)));
        assert_eq!(item_dir(&base.join(rel)), expected);
    }

    #[test]
    fn resolve_item_prefers_git_config() {
        let temp = TempRepo::new("remote-owner", "remote-repo", "main");
        let item_repo = init_repo(&temp.path().join("gh/3")).unwrap();
        set_config(&item_repo, OWNER, "cfg-owner").unwrap();
        set_config(&item_repo, REPO, "cfg-repo").unwrap();
        set_config(&item_repo, NUMBER, "99").unwrap();

        let item = resolve_item(&temp.path().join("gh/3")).unwrap();
        assert_eq!(item, ItemRef::new("cfg-owner", "cfg-repo", 99));
    }

    #[test]
    fn resolve_item_from_layout_uses_project_remote() {
        let temp = TempRepo::new("owner", "project", "main");
        let dir = temp.path().join("gh/42");
        init_repo(&dir).unwrap();

        let item = resolve_item(&dir).unwrap();
        assert_eq!(item, ItemRef::new("owner", "project", 42));
    }

    #[test]
    fn resolve_item_from_description_header() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join(DRAFT_DESCRIPTION),
            "# [o/r#7](https://github.com/o/r/pull/7) Title\n",
        )
        .unwrap();

        assert_eq!(resolve_item(dir.path()).unwrap(), ItemRef::new("o", "r", 7));
    }

    #[test]
    fn resolve_item_fails_with_layout_hint() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = resolve_item(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ItemError>(),
            Some(ItemError::Unresolved(_))
        ));
        assert!(err.to_string().contains("gh/{number}"));
    }

    #[rstest]
    #[case::valid("owner/repo", true)]
    #[case::missing_repo("owner/", false)]
    #[case::no_slash("owner", false)]
    #[case::too_many("a/b/c", false)]
    fn parse_owner_repo_cases(#[case] arg: &str, #[case] ok: bool) {
        assert_eq!(parse_owner_repo(arg).is_ok(), ok);
    }

    #[test]
    fn resolve_owner_repo_falls_back_to_enclosing_repo() {
        let temp = TempRepo::new("owner", "project", "main");
        let draft = temp.path().join("gh/new");
        init_repo(&draft).unwrap();

        let pair = resolve_owner_repo(None, &draft).unwrap();
        assert_eq!(pair, Some(("owner".to_string(), "project".to_string())));

        let explicit = resolve_owner_repo(Some("other/thing"), &draft).unwrap();
        assert_eq!(explicit, Some(("other".to_string(), "thing".to_string())));
    }

    #[tokio::test]
    async fn resolve_kind_uses_config_then_api() {
        let mock = GitHubMockServer::start().await;
        mock.repo("owner", "repo")
            .issue(4)
            .pull_request(true)
            .get()
            .await;
        let client = mock.client();
        let item = ItemRef::new("owner", "repo", 4);

        assert_eq!(
            resolve_kind(None, &client, &item).await.unwrap(),
            ItemKind::Pr
        );

        let temp = TempRepo::without_origin("main");
        let repo = temp.open();
        set_config(&repo, TYPE, "issue").unwrap();
        assert_eq!(
            resolve_kind(Some(&repo), &client, &item).await.unwrap(),
            ItemKind::Issue
        );
    }
}
