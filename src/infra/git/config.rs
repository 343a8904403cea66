//! Repository-local git config access.

use git2::{ConfigLevel, Repository};

use super::error::Result;

/// Read a config value visible from `repo`. Empty values are treated as unset.
pub fn get_config(repo: &Repository, key: &str) -> Option<String> {
    let config = repo.config().ok()?;
    config.get_string(key).ok().filter(|v| !v.is_empty())
}

/// Write a value into the repository's own `.git/config`.
pub fn set_config(repo: &Repository, key: &str, value: &str) -> Result<()> {
    let mut config = repo.config()?.open_level(ConfigLevel::Local)?;
    config.set_str(key, value)?;
    Ok(())
}
