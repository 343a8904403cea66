//! Git error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not in a git repository")]
    NotInRepo,

    #[error("Repository has no working directory")]
    BareRepo,

    #[error("HEAD is detached; specify a branch explicitly")]
    DetachedHead,

    #[error("Could not parse GitHub URL: {0}")]
    InvalidGitHubUrl(String),

    #[error("Remote '{0}' not found")]
    RemoteNotFound(String),

    #[error("Push to '{remote}' rejected for {refname}: {message}")]
    PushRejected {
        remote: String,
        refname: String,
        message: String,
    },

    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

pub type Result<T> = anyhow::Result<T>;
