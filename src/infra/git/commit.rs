//! Index, commit and tree operations.

use git2::{Commit, ErrorCode, ObjectType, Oid, Repository, Signature, Tree};
use std::path::Path;

use super::error::Result;

/// Signature from the repository config, falling back to a fixed identity
/// when `user.name`/`user.email` are not configured.
pub fn signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(sig) => Ok(sig.to_owned()),
        Err(_) => Ok(Signature::now("ghpr", "ghpr@users.noreply.github.com")?),
    }
}

/// The commit HEAD points to, or `None` for an unborn branch.
pub fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Stage `add` and unstage/remove `remove` (paths relative to the workdir),
/// then commit on HEAD.
pub fn commit_paths(
    repo: &Repository,
    add: &[&str],
    remove: &[&str],
    message: &str,
) -> Result<Oid> {
    let mut index = repo.index()?;
    for path in remove {
        // Missing entries are fine: the draft may never have been staged.
        let _ = index.remove_path(Path::new(path));
    }
    for path in add {
        index.add_path(Path::new(path))?;
    }
    index.write()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let sig = signature(repo)?;
    let parent = head_commit(repo)?;
    let parents: Vec<&Commit<'_>> = parent.iter().collect();

    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
}

/// Read a top-level file from the HEAD commit.
///
/// Returns `None` when there is no commit yet or the file is not in HEAD.
pub fn read_head_file(repo: &Repository, name: &str) -> Result<Option<String>> {
    let Some(commit) = head_commit(repo)? else {
        return Ok(None);
    };
    let tree = commit.tree()?;
    let entry = match tree.get_path(Path::new(name)) {
        Ok(entry) => entry,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let blob = entry.to_object(repo)?.peel_to_blob()?;
    Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
}

/// Names of the top-level files in the HEAD commit.
pub fn head_file_names(repo: &Repository) -> Result<Vec<String>> {
    let Some(commit) = head_commit(repo)? else {
        return Ok(Vec::new());
    };
    let tree = commit.tree()?;
    Ok(tree
        .iter()
        .filter(|e| e.kind() == Some(ObjectType::Blob))
        .filter_map(|e| e.name().map(str::to_string))
        .collect())
}

/// A file written into a branch by [`commit_files_to_branch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub name: String,
    pub blob: Oid,
}

/// Commit `files` onto `branch` without touching the index or work tree.
///
/// The new tree is the branch's current tree plus `files`. A branch that does
/// not exist yet is created as an orphan (a root commit).
pub fn commit_files_to_branch(
    repo: &Repository,
    branch: &str,
    files: &[(String, Vec<u8>)],
    message: &str,
) -> Result<Vec<CommittedFile>> {
    let refname = format!("refs/heads/{branch}");
    let parent = match repo.find_reference(&refname) {
        Ok(r) => Some(r.peel_to_commit()?),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let base_tree: Option<Tree<'_>> = match &parent {
        Some(c) => Some(c.tree()?),
        None => None,
    };

    let mut builder = repo.treebuilder(base_tree.as_ref())?;
    let mut committed = Vec::with_capacity(files.len());
    for (name, content) in files {
        let blob = repo.blob(content)?;
        builder.insert(name, blob, 0o100644)?;
        committed.push(CommittedFile {
            name: name.clone(),
            blob,
        });
    }
    let tree = repo.find_tree(builder.write()?)?;
    let sig = signature(repo)?;
    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    repo.commit(Some(&refname), &sig, &sig, message, &tree, &parents)?;

    Ok(committed)
}

/// Whether a local branch exists.
pub fn branch_exists(repo: &Repository, branch: &str) -> bool {
    repo.find_branch(branch, git2::BranchType::Local).is_ok()
}
