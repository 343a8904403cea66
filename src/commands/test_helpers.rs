//! Fixtures shared by command tests.

use std::fs;
use std::path::Path;

use git2::Repository;
use tempfile::TempDir;

use crate::infra::git::test_utils::{TempRepo, bare_remote};
use crate::infra::git::{commit_paths, read_head_file, set_config};
use crate::item::config::{GIST, store_item};
use crate::item::description::write_description;
use crate::item::{ItemKind, ItemRef};

pub const GIST_ID: &str = "0123456789abcdef0123";

pub fn item(number: u64) -> ItemRef {
    ItemRef::new("owner", "repo", number)
}

/// A clone of `owner/repo#number` with its description committed.
pub fn item_clone(number: u64, kind: ItemKind, title: &str, body: &str) -> TempRepo {
    let temp = TempRepo::without_origin("main");
    let repo = temp.open();
    let item = item(number);
    let url = item.html_url(kind);
    let name = write_description(&temp.path(), &item, title, body, &url).unwrap();
    store_item(&repo, &item, &url, kind).unwrap();
    commit_paths(&repo, &[&name], &[], "Initial clone").unwrap();
    temp
}

/// Write `name` in the work tree and commit it.
pub fn commit_file(repo: &Repository, dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
    commit_paths(repo, &[name], &[], &format!("Add {name}")).unwrap();
}

/// Give the clone a gist: `pr.gist` plus a bare repository as remote `g`.
pub fn attach_bare_gist(repo: &Repository) -> TempDir {
    let bare = bare_remote();
    repo.remote("g", bare.path().to_str().unwrap()).unwrap();
    set_config(repo, GIST, GIST_ID).unwrap();
    bare
}

pub fn head_message(repo: &Repository) -> String {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    head.message().unwrap().to_string()
}

pub fn head_file(repo: &Repository, name: &str) -> Option<String> {
    read_head_file(repo, name).unwrap()
}

/// JSON body of the `index`th recorded request.
pub fn sent_json(requests: &[wiremock::Request], index: usize) -> serde_json::Value {
    serde_json::from_slice(&requests[index].body).unwrap()
}
