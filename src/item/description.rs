//! The description file: `{repo}#{N}.md` (or `DESCRIPTION.md` before the
//! item exists on GitHub).

use std::fs;
use std::io;
use std::path::Path;

use git2::Repository;
use lazy_regex::{regex_captures, regex_is_match};

use super::spec::{ItemRef, extract_title};
use crate::infra::git::{self, read_head_file};

/// Description file name of an item that has not been created yet.
pub const DRAFT_DESCRIPTION: &str = "DESCRIPTION.md";

pub fn description_filename(repo: &str, number: u64) -> String {
    format!("{repo}#{number}.md")
}

fn is_item_description(name: &str) -> bool {
    regex_is_match!(r"^[^#]+#\d+\.md$", name)
}

/// Name of the description file in `dir`: the first `*#N.md` in sorted order,
/// else `DESCRIPTION.md` if present.
pub fn find_description_file(dir: &Path) -> io::Result<Option<String>> {
    let mut candidates: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_item_description(name))
        .collect();
    candidates.sort();
    if let Some(first) = candidates.into_iter().next() {
        return Ok(Some(first));
    }
    if dir.join(DRAFT_DESCRIPTION).is_file() {
        return Ok(Some(DRAFT_DESCRIPTION.to_string()));
    }
    Ok(None)
}

/// Render a description in link-reference style.
///
/// The body is kept verbatim. The `[owner/repo#N]: url` definition is
/// appended unless the body already defines it.
pub fn render_description(item: &ItemRef, title: &str, body: &str, url: &str) -> String {
    let reference = item.to_string();
    let definition_prefix = format!("[{reference}]:");
    let has_definition = body
        .lines()
        .any(|line| line.starts_with(&definition_prefix));

    let mut out = format!("# [{reference}] {title}\n");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    if !has_definition {
        if !body.is_empty() && !body.ends_with('\n') {
            out.push('\n');
        }
        if !body.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(&format!("[{reference}]: {url}\n"));
    }
    out
}

/// Write `{repo}#{N}.md` into `dir`, returning the file name.
pub fn write_description(
    dir: &Path,
    item: &ItemRef,
    title: &str,
    body: &str,
    url: &str,
) -> io::Result<String> {
    let name = description_filename(&item.repo, item.number);
    fs::write(dir.join(&name), render_description(item, title, body, url))?;
    Ok(name)
}

/// Title and body as pushed to GitHub.
///
/// The body is everything after the first line, without leading blank lines
/// and trailing whitespace.
pub fn split_title_body(content: &str) -> (String, String) {
    let mut lines = content.split('\n');
    let title = extract_title(lines.next().unwrap_or_default());
    let body: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
    (title, body.join("\n").trim_end().to_string())
}

fn is_link_definition(line: &str) -> bool {
    regex_is_match!(r"^\[[^\]]+\]:\s*https?://", line)
}

fn body_after_header(lines: &[&str]) -> String {
    let body: Vec<&str> = lines
        .iter()
        .copied()
        .skip_while(|line| line.trim().is_empty())
        .collect();
    body.join("\n").trim_end().to_string()
}

/// Title and body of a description for creating the item.
///
/// Accepts `# [owner/repo#N] Title` (link definitions dropped from the body),
/// `# [owner/repo#N](url) Title` and `# Title`. Returns `None` when the first
/// line is none of these.
pub fn parse_description(content: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = content.split('\n').collect();
    let first = lines.first()?.trim();
    let rest = lines.get(1..).unwrap_or_default();

    if let Some((_, _, title)) = regex_captures!(r"^#\s*\[([^/\]]+/[^#\]]+#\d+)\]\s+(.*)$", first)
    {
        let mut body: Vec<&str> = Vec::new();
        for line in rest {
            if (body.is_empty() && line.trim().is_empty()) || is_link_definition(line) {
                continue;
            }
            body.push(line);
        }
        while body.last().is_some_and(|line| line.trim().is_empty()) {
            body.pop();
        }
        return Some((title.trim().to_string(), body.join("\n").trim_end().to_string()));
    }

    if let Some((_, _, _, _, title)) = regex_captures!(
        r"^#\s*\[([^/\]]+)/([^#\]]+)#(\d+)\](?:\([^)]+\))?\s*(.*)$",
        first
    ) {
        return Some((title.trim().to_string(), body_after_header(rest)));
    }

    if let Some((_, title)) = regex_captures!(r"^#\s+(.+)$", first) {
        return Some((title.trim().to_string(), body_after_header(rest)));
    }

    None
}

/// Owner, repo and number from an inline-link header
/// `# [owner/repo#N](url) Title`.
pub fn item_from_inline_header(first_line: &str) -> Option<ItemRef> {
    let (_, owner, repo, number) = regex_captures!(
        r"^#\s*\[([^/\]]+)/([^#\]]+)#(\d+)\](?:\([^)]+\))?",
        first_line.trim()
    )?;
    Some(ItemRef::new(owner, repo, number.parse().ok()?))
}

/// A description file read from the HEAD commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedDescription {
    pub filename: String,
    pub content: String,
}

/// The description as committed in HEAD, with LF line endings.
///
/// The file is located in the work tree, then read from HEAD so uncommitted
/// edits are ignored. `None` when there is no description file or it is not
/// in HEAD.
pub fn read_description_from_head(repo: &Repository) -> anyhow::Result<Option<CommittedDescription>> {
    let dir = git::workdir(repo)?;
    let Some(filename) = find_description_file(&dir)? else {
        return Ok(None);
    };
    let Some(content) = read_head_file(repo, &filename)? else {
        return Ok(None);
    };
    Ok(Some(CommittedDescription {
        filename,
        content: content.replace("\r\n", "\n"),
    }))
}
