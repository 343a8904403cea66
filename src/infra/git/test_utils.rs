//! Test utilities for creating temporary git repositories.

use git2::{Repository, RepositoryInitOptions};
use std::path::PathBuf;
use tempfile::TempDir;

use super::repo::open_repo_at;

/// A temporary git repository for testing.
pub struct TempRepo {
    pub dir: TempDir,
}

impl TempRepo {
    /// Create a new temporary git repository with a GitHub-style origin remote.
    pub fn new(owner: &str, repo_name: &str, branch: &str) -> Self {
        let temp = Self::without_origin(branch);
        let url = format!("https://github.com/{owner}/{repo_name}.git");
        temp.open().remote("origin", &url).expect("set origin");
        temp
    }

    /// Create a repository with an initial commit on `branch` and no remotes.
    pub fn without_origin(branch: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(branch);
        let repo = Repository::init_opts(dir.path(), &opts).expect("init repo");

        {
            let mut config = repo.config().expect("repo config");
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }

        // Create initial commit so HEAD exists
        {
            let sig = git2::Signature::now("Test", "test@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .expect("create initial commit");
        }

        Self { dir }
    }

    /// Get the path to the repository.
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Open the repository.
    pub fn open(&self) -> Repository {
        open_repo_at(self.dir.path()).expect("open temp repo")
    }
}

/// An empty bare repository usable as a push target (stands in for a gist).
pub fn bare_remote() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    Repository::init_bare(dir.path()).expect("init bare repo");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::git::{get_config, github_remote};

    #[test]
    fn test_temp_repo_creates_valid_repo() {
        let temp = TempRepo::new("test-owner", "test-repo", "main");
        let repo = temp.open();

        assert_eq!(repo.head().unwrap().shorthand(), Some("main"));

        let (owner, repo_name) = github_remote(&repo).unwrap();
        assert_eq!(owner, "test-owner");
        assert_eq!(repo_name, "test-repo");
        assert_eq!(get_config(&repo, "user.name").as_deref(), Some("Test"));
    }
}
