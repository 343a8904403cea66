//! Helpers shared across ghpr subcommands.

use std::env;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::infra::git::open_repo_at;
use crate::item::ItemRef;
use crate::item::locate::resolve_item;
use crate::shared::config::{Config, load_config};
use crate::shared::env_var::EnvVars;

/// Working directory plus the user settings a command runs with.
pub struct Workspace {
    pub cwd: PathBuf,
    pub config: Config,
    pub env: EnvVars,
}

impl Workspace {
    /// The current directory, the user config file and the environment.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            cwd: env::current_dir()?,
            config: load_config()?,
            env: EnvVars::load(),
        })
    }

    /// Default settings rooted at `dir`.
    #[cfg(test)]
    pub fn at(dir: &Path) -> Self {
        Self {
            cwd: dir.to_path_buf(),
            config: Config::default(),
            env: EnvVars::default(),
        }
    }

    /// Default name of the gist remote.
    pub fn gist_remote(&self) -> &str {
        &self.config.gist.remote
    }

    /// `path` relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// An item clone: its repository and the item it mirrors.
pub struct ItemClone {
    pub repo: Repository,
    pub item: ItemRef,
}

impl ItemClone {
    /// The clone containing `ws.cwd`.
    pub fn open(ws: &Workspace) -> anyhow::Result<Self> {
        let item = resolve_item(&ws.cwd)?;
        let repo = open_repo_at(&ws.cwd)?;
        debug!(%item, "opened item clone");
        Ok(Self { repo, item })
    }
}

/// Open `url` in the browser; failures only warn.
pub fn open_in_browser(url: &str) {
    match open::that(url) {
        Ok(()) => eprintln!("Opened: {url}"),
        Err(e) => eprintln!("Warning: could not open {url}: {e}"),
    }
}

/// First `max_lines` lines of `text`, plus the count of lines left out.
pub fn preview_lines(text: &str, max_lines: usize) -> (Vec<&str>, usize) {
    let lines: Vec<&str> = text.trim().split('\n').collect();
    let hidden = lines.len().saturating_sub(max_lines);
    (lines.into_iter().take(max_lines).collect(), hidden)
}
