//! Comment files `z{id}-{author}.md` and draft comments `new*.md`.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use git2::Repository;

use crate::infra::git::{head_file_names, read_head_file};
use crate::infra::github::RemoteComment;

const AUTHOR: &str = "<!-- author:";
const CREATED_AT: &str = "<!-- created_at:";
const UPDATED_AT: &str = "<!-- updated_at:";

pub fn comment_filename(id: u64, author: &str) -> String {
    format!("z{id}-{author}.md")
}

/// GitHub's timestamp format, e.g. `2024-01-01T00:00:00Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Metadata header followed by a blank line and the body verbatim.
/// `updated_at` is written only when it differs from `created_at`.
pub fn render_comment(
    author: &str,
    created_at: &str,
    updated_at: Option<&str>,
    body: &str,
) -> String {
    let mut out = format!("{AUTHOR} {author} -->\n{CREATED_AT} {created_at} -->\n");
    if let Some(updated_at) = updated_at.filter(|u| *u != created_at) {
        out.push_str(&format!("{UPDATED_AT} {updated_at} -->\n"));
    }
    out.push('\n');
    out.push_str(body);
    out
}

/// Write a remote comment into `dir`, returning the file name.
pub fn write_comment_file(dir: &Path, comment: &RemoteComment) -> io::Result<String> {
    let name = comment_filename(comment.id, &comment.author);
    let created_at = format_timestamp(&comment.created_at);
    let updated_at = comment.updated_at.as_ref().map(format_timestamp);
    let content = render_comment(
        &comment.author,
        &created_at,
        updated_at.as_deref(),
        &comment.body,
    );
    fs::write(dir.join(&name), content)?;
    Ok(name)
}

/// A comment file's metadata and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub body: String,
}

fn header_value(line: &str, prefix: &str) -> Option<String> {
    let rest = line.strip_prefix(prefix)?;
    Some(rest.replace("-->", "").trim().to_string())
}

/// Parse a comment file.
///
/// Lines starting with `<!--` form the header. The body starts at the first
/// other line, with leading whitespace removed; trailing content is kept.
pub fn parse_comment(content: &str) -> ParsedComment {
    let mut parsed = ParsedComment::default();
    let mut offset = content.len();
    let mut pos = 0;

    for line in content.split_inclusive('\n') {
        let stripped = line.trim();
        if let Some(v) = header_value(stripped, AUTHOR) {
            parsed.author = Some(v);
        } else if let Some(v) = header_value(stripped, CREATED_AT) {
            parsed.created_at = Some(v);
        } else if let Some(v) = header_value(stripped, UPDATED_AT) {
            parsed.updated_at = Some(v);
        } else if !stripped.starts_with("<!--") {
            offset = pos;
            break;
        }
        pos += line.len();
    }

    parsed.body = content[offset..].trim_start().to_string();
    parsed
}

/// Comment id of `z{id}-{author}.md` or legacy `z{id}.md`.
pub fn comment_id_from_filename(name: &str) -> Option<u64> {
    let middle = name.strip_prefix('z')?.strip_suffix(".md")?;
    let id = middle.split('-').next()?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

fn is_comment_filename(name: &str) -> bool {
    name.starts_with('z') && name.ends_with(".md")
}

/// Sorted `z*.md` file names in `dir`.
pub fn list_comment_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_comment_filename(name))
        .collect();
    names.sort();
    Ok(names)
}

pub fn is_draft_filename(name: &str) -> bool {
    name.starts_with("new") && name.ends_with(".md")
}

/// A draft comment committed in HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub filename: String,
    pub content: String,
}

/// Draft comments in the HEAD tree, sorted by file name.
pub fn head_drafts(repo: &Repository) -> anyhow::Result<Vec<Draft>> {
    let mut names: Vec<String> = head_file_names(repo)?
        .into_iter()
        .filter(|name| is_draft_filename(name))
        .collect();
    names.sort();

    let mut drafts = Vec::with_capacity(names.len());
    for filename in names {
        if let Some(content) = read_head_file(repo, &filename)? {
            drafts.push(Draft { filename, content });
        }
    }
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::git::commit_paths;
    use crate::infra::git::test_utils::TempRepo;
    use indoc::indoc;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn render_comment_omits_unchanged_updated_at() {
        let content = render_comment(
            "alice",
            "2024-01-01T00:00:00Z",
            Some("2024-01-01T00:00:00Z"),
            "Hello\n",
        );
        assert_eq!(
            content,
            indoc! {"
                <!-- author: alice -->
                <!-- created_at: 2024-01-01T00:00:00Z -->

                Hello
            "}
        );
    }

    #[test]
    fn render_then_parse_keeps_metadata_and_body() {
        let content = render_comment(
            "bob",
            "2024-01-01T00:00:00Z",
            Some("2024-01-02T00:00:00Z"),
            "  indented first line\nsecond\n\n",
        );
        let parsed = parse_comment(&content);
        assert_eq!(parsed.author.as_deref(), Some("bob"));
        assert_eq!(parsed.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(parsed.updated_at.as_deref(), Some("2024-01-02T00:00:00Z"));
        // Leading whitespace is not preserved; trailing content is.
        assert_eq!(parsed.body, "indented first line\nsecond\n\n");
    }

    #[test]
    fn parse_comment_skips_unknown_html_comments_in_header() {
        let content = "<!-- author: carol -->\n<!-- note: x -->\nBody";
        let parsed = parse_comment(content);
        assert_eq!(parsed.author.as_deref(), Some("carol"));
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn parse_comment_header_only_has_empty_body() {
        let parsed = parse_comment("<!-- author: dave -->\n<!-- created_at: x -->\n");
        assert_eq!(parsed.author.as_deref(), Some("dave"));
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn parse_comment_without_header() {
        let parsed = parse_comment("\n\nplain body");
        assert_eq!(parsed.author, None);
        assert_eq!(parsed.body, "plain body");
    }

    #[rstest]
    #[case::with_author("z123-alice.md", Some(123))]
    #[case::author_with_dash("z123-some-bot.md", Some(123))]
    #[case::legacy("z456.md", Some(456))]
    #[case::no_prefix("123-alice.md", None)]
    #[case::not_markdown("z123-alice.txt", None)]
    #[case::non_numeric("zebra.md", None)]
    #[case::empty_id("z-alice.md", None)]
    fn comment_id_from_filenames(#[case] name: &str, #[case] expected: Option<u64>) {
        assert_eq!(comment_id_from_filename(name), expected);
    }

    #[rstest]
    #[case("new.md", true)]
    #[case("new-reply.md", true)]
    #[case("newer.txt", false)]
    #[case("z1-new.md", false)]
    fn draft_filenames(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_draft_filename(name), expected);
    }

    #[test]
    fn write_comment_file_uses_id_and_author() {
        let dir = TempDir::new().unwrap();
        let comment = RemoteComment {
            id: 77,
            author: "erin".to_string(),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            updated_at: Some("2024-03-02T10:00:00Z".parse().unwrap()),
            body: "Looks good".to_string(),
            html_url: "https://github.com/o/r/pull/1#issuecomment-77".to_string(),
        };
        let name = write_comment_file(dir.path(), &comment).unwrap();
        assert_eq!(name, "z77-erin.md");

        let parsed = parse_comment(&fs::read_to_string(dir.path().join(&name)).unwrap());
        assert_eq!(parsed.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(parsed.updated_at.as_deref(), Some("2024-03-02T10:00:00Z"));
        assert_eq!(parsed.body, "Looks good");
    }

    #[test]
    fn list_comment_files_is_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["z20-b.md", "z3-a.md", "repo#1.md", "new.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(
            list_comment_files(dir.path()).unwrap(),
            vec!["z20-b.md".to_string(), "z3-a.md".to_string()]
        );
    }

    #[test]
    fn head_drafts_reads_committed_drafts_only() {
        let temp = TempRepo::without_origin("main");
        let repo = temp.open();
        fs::write(temp.path().join("new.md"), "Draft reply\n").unwrap();
        fs::write(temp.path().join("z1-a.md"), "posted").unwrap();
        commit_paths(&repo, &["new.md", "z1-a.md"], &[], "drafts").unwrap();
        fs::write(temp.path().join("new-2.md"), "uncommitted").unwrap();

        let drafts = head_drafts(&repo).unwrap();
        assert_eq!(
            drafts,
            vec![Draft {
                filename: "new.md".to_string(),
                content: "Draft reply\n".to_string(),
            }]
        );
    }
}
