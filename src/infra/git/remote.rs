//! Remotes, fetch and push.

use std::cell::{Cell, RefCell};

use git2::{Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks, Repository};
use tracing::{debug, info};

use super::error::{GitError, Result};

/// All remotes as `(name, url)` pairs, in git's order.
pub fn list_remotes(repo: &Repository) -> Result<Vec<(String, String)>> {
    let names = repo.remotes()?;
    let mut remotes = Vec::new();
    for name in names.iter().flatten() {
        let url = repo
            .find_remote(name)
            .ok()
            .and_then(|r| r.url().map(str::to_string))
            .unwrap_or_default();
        remotes.push((name.to_string(), url));
    }
    Ok(remotes)
}

/// URL of a remote, if it exists.
pub fn remote_url(repo: &Repository, name: &str) -> Option<String> {
    repo.find_remote(name)
        .ok()
        .and_then(|r| r.url().map(str::to_string))
}

/// Add `name` pointing at `url`, or repoint it when it already exists.
pub fn ensure_remote(repo: &Repository, name: &str, url: &str) -> Result<()> {
    match remote_url(repo, name) {
        Some(existing) if existing == url => {}
        Some(_) => {
            repo.remote_set_url(name, url)?;
            debug!(remote = name, url, "updated remote url");
        }
        None => {
            repo.remote(name, url)?;
            debug!(remote = name, url, "added remote");
        }
    }
    Ok(())
}

/// macOS-specific system gitconfig paths that libgit2 doesn't recognize.
/// libgit2 only looks at /etc/gitconfig for system config, but macOS has
/// credential.helper configured in these paths.
/// See: https://github.com/libgit2/libgit2/issues/6883
#[cfg(target_os = "macos")]
const MACOS_SYSTEM_CONFIGS: &[&str] = &[
    "/opt/homebrew/etc/gitconfig", // Homebrew (Apple Silicon)
    "/usr/local/etc/gitconfig",    // Homebrew (Intel)
    "/Library/Developer/CommandLineTools/usr/share/git-core/gitconfig", // Xcode CLT
];

/// Build a git config that includes additional system gitconfig paths.
fn build_config_with_system_paths(repo: &Repository) -> Result<git2::Config> {
    #[cfg(target_os = "macos")]
    let extra_paths = MACOS_SYSTEM_CONFIGS;
    #[cfg(not(target_os = "macos"))]
    let extra_paths: &[&str] = &[];

    let mut config = repo.config()?;
    for path_str in extra_paths {
        let path = std::path::Path::new(path_str);
        if path.exists() {
            // Lowest priority; unreadable files are skipped.
            let _ = config.add_file(path, git2::ConfigLevel::System, false);
        }
    }
    Ok(config)
}

/// Maximum credential callback invocations before giving up. libgit2 keeps
/// asking while the server rejects what we hand it.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 4;

/// Callbacks that try, in order: the ssh agent, the git credential helper,
/// then the token from `gh auth token`.
fn credential_callbacks<'a>(config: &'a git2::Config, attempts: &'a Cell<u32>) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed_types| {
        let attempt = attempts.get() + 1;
        attempts.set(attempt);
        if attempt > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed_types.contains(CredentialType::SSH_KEY)
            && let Some(username) = username_from_url
            && let Ok(cred) = Cred::ssh_key_from_agent(username)
        {
            return Ok(cred);
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            // The credential helper gets the first try; the gh token after.
            if attempt == 1
                && let Ok(cred) = Cred::credential_helper(config, url, username_from_url)
            {
                return Ok(cred);
            }
            if let Ok(token) = crate::infra::github::gh_token() {
                return Cred::userpass_plaintext(username_from_url.unwrap_or("x-access-token"), &token);
            }
        }

        Cred::default()
    });
    callbacks
}

/// Push `refspecs` to `remote_name`.
///
/// Server-side rejections of individual refs are reported as
/// [`GitError::PushRejected`].
pub fn push(repo: &Repository, remote_name: &str, refspecs: &[String]) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| GitError::RemoteNotFound(remote_name.to_string()))?;
    let config = build_config_with_system_paths(repo)?;
    let attempts = Cell::new(0);
    let rejected: RefCell<Option<(String, String)>> = RefCell::new(None);

    {
        let mut callbacks = credential_callbacks(&config, &attempts);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                *rejected.borrow_mut() = Some((refname.to_string(), message.to_string()));
            }
            Ok(())
        });
        let mut opts = PushOptions::new();
        opts.remote_callbacks(callbacks);

        info!(remote = remote_name, ?refspecs, "pushing");
        remote.push(refspecs, Some(&mut opts))?;
    }

    if let Some((refname, message)) = rejected.into_inner() {
        return Err(GitError::PushRejected {
            remote: remote_name.to_string(),
            refname,
            message,
        }
        .into());
    }
    Ok(())
}

/// Force-push a local branch to the same name on `remote_name`.
pub fn force_push_branch(repo: &Repository, remote_name: &str, branch: &str) -> Result<()> {
    push(
        repo,
        remote_name,
        &[format!("+refs/heads/{branch}:refs/heads/{branch}")],
    )
}

/// Fetch all branches of `remote_name`.
pub fn fetch(repo: &Repository, remote_name: &str) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| GitError::RemoteNotFound(remote_name.to_string()))?;
    let config = build_config_with_system_paths(repo)?;
    let attempts = Cell::new(0);
    let callbacks = credential_callbacks(&config, &attempts);

    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(callbacks);

    debug!(remote = remote_name, "fetching");
    remote.fetch(&[] as &[&str], Some(&mut fetch_opts), None)?;
    Ok(())
}

/// Create local `branch` from `{remote}/{branch}` when only the remote one
/// exists. Returns whether the branch was created.
pub fn branch_from_remote(repo: &Repository, branch: &str, remote_name: &str) -> Result<bool> {
    if repo.find_branch(branch, git2::BranchType::Local).is_ok() {
        return Ok(false);
    }
    let Ok(tracking) = repo.find_branch(&format!("{remote_name}/{branch}"), git2::BranchType::Remote)
    else {
        return Ok(false);
    };
    let commit = tracking.get().peel_to_commit()?;
    repo.branch(branch, &commit, false)?;
    debug!(branch, remote = remote_name, "created local branch from remote");
    Ok(true)
}

/// Make `branch` track `{remote}/{branch}`.
pub fn set_upstream(repo: &Repository, branch: &str, remote_name: &str) -> Result<()> {
    let mut local = repo.find_branch(branch, git2::BranchType::Local)?;
    local.set_upstream(Some(&format!("{remote_name}/{branch}")))?;
    Ok(())
}
