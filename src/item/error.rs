//! Item resolution and local file format errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Invalid item spec '{0}'. Use NUMBER, owner/repo#NUMBER, or a GitHub issue/PR URL")]
    InvalidSpec(String),

    #[error("Invalid repo format '{0}'. Use owner/repo")]
    InvalidRepo(String),

    #[error(
        "Could not determine PR/issue from {0}. Expected a directory named 'gh/{{number}}', \
         'pr{{number}}' or 'issue{{number}}', pr.* git config, or a DESCRIPTION.md with an \
         '# [owner/repo#number](url)' header"
    )]
    Unresolved(PathBuf),

    #[error("Could not determine repository from the git remotes of {0}")]
    NoGitHubRemote(PathBuf),

    #[error("Could not determine repository. Configure with 'ghpr init -r owner/repo' or use -r/--repo")]
    NoRepository,

    #[error("No description file found in {0}")]
    DescriptionNotFound(PathBuf),

    #[error("{0} is not committed; commit it first")]
    DescriptionNotCommitted(String),

    #[error("Could not parse {0}: expected an '# Title' first line")]
    InvalidDescription(String),

    #[error("Missing git config '{0}'; not in a ghpr clone?")]
    MissingConfig(&'static str),
}
