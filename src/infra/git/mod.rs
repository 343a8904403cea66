//! Git operations through libgit2.

mod commit;
mod config;
mod error;
mod github;
mod remote;
mod repo;

#[cfg(test)]
pub mod test_utils;

pub use commit::{
    branch_exists, commit_files_to_branch, commit_paths, head_file_names, read_head_file,
};
pub use config::{get_config, set_config};
pub use github::github_remote;
pub use remote::{
    branch_from_remote, ensure_remote, fetch, force_push_branch, list_remotes, push, remote_url, set_upstream,
};
pub use repo::{
    MAIN_BRANCH, enclosing_repo, init_repo, open_repo_at, pr_head_branch, workdir,
};
