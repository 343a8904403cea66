//! Repository operations.

use git2::{Branch, Repository, RepositoryInitOptions, RepositoryOpenFlags};
use std::path::{Path, PathBuf};

use super::error::{GitError, Result};

/// Branch name used for every item repository.
pub const MAIN_BRANCH: &str = "main";

/// Open a git repository from a specific path, searching parent directories.
pub fn open_repo_at(path: &Path) -> Result<Repository> {
    Repository::open_ext(
        path,
        RepositoryOpenFlags::empty(),
        std::iter::empty::<&Path>(),
    )
    .map_err(|_| GitError::NotInRepo.into())
}

/// Create `path` (and parents) and initialize a repository whose HEAD points
/// at `main`.
pub fn init_repo(path: &Path) -> Result<Repository> {
    std::fs::create_dir_all(path)?;
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(MAIN_BRANCH);
    Ok(Repository::init_opts(path, &opts)?)
}

/// Working directory of a non-bare repository.
pub fn workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| GitError::BareRepo.into())
}

/// Open the nearest repository that encloses `repo` (starting from the
/// parent of its working directory).
///
/// Item repositories live inside the project they mirror (`gh/{N}` under the
/// project root), so this finds the project repository.
pub fn enclosing_repo(repo: &Repository) -> Option<Repository> {
    let dir = workdir(repo).ok()?;
    enclosing_repo_of(&dir)
}

/// Open the nearest repository strictly above `dir`.
pub fn enclosing_repo_of(dir: &Path) -> Option<Repository> {
    let parent = dir.parent()?;
    open_repo_at(parent).ok()
}

/// Branch name to use as a PR head for the checked-out branch.
///
/// Prefers the upstream branch name (without the remote prefix), so a local
/// `feature` tracking `origin/user/feature` yields `user/feature`.
pub fn pr_head_branch(repo: &Repository) -> Result<String> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(GitError::DetachedHead.into());
    }
    let local = head.shorthand().unwrap_or("HEAD").to_string();
    let refname = head.name().map(str::to_string);
    let branch = Branch::wrap(head);

    let Ok(upstream) = branch.upstream() else {
        return Ok(local);
    };
    let Some(upstream_name) = upstream.name()?.map(str::to_string) else {
        return Ok(local);
    };

    let remote = refname
        .and_then(|r| repo.branch_upstream_remote(&r).ok())
        .and_then(|buf| buf.as_str().map(str::to_string));
    Ok(strip_remote_prefix(&upstream_name, remote.as_deref()))
}

/// `origin/feature/x` → `feature/x`.
fn strip_remote_prefix(upstream: &str, remote: Option<&str>) -> String {
    if let Some(remote) = remote
        && let Some(rest) = upstream.strip_prefix(&format!("{remote}/"))
    {
        return rest.to_string();
    }
    upstream
        .split_once('/')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_else(|| upstream.to_string())
}
