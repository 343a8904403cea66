//! The "Synced with gist" footer appended to GitHub bodies.

use lazy_regex::{regex_captures, regex_is_match};

pub const GHPR_URL: &str = "https://github.com/runsascoded/ghpr";

/// Split a trailing gist footer off `body`.
///
/// Returns the body without the footer (trailing whitespace trimmed) and the
/// gist URL, or the input unchanged and `None` when there is no footer.
pub fn extract_gist_footer(body: &str) -> (String, Option<String>) {
    let trimmed = body.trim_end();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    let n = lines.len();
    let Some(last) = lines.last().map(|l| l.trim()) else {
        return (body.to_string(), None);
    };
    let blank = |i: usize| lines[i].trim().is_empty();
    let rule = |i: usize| lines[i].trim() == "---";
    let strip = |keep: usize| lines[..keep].join("\n").trim_end().to_string();

    if n >= 3 && last.contains("Synced with [gist](") {
        let url = regex_captures!(
            r"\[gist\]\((https://gist\.github\.com/[a-f0-9]+(?:/[a-f0-9]+)?)\)",
            last
        )
        .map(|(_, url)| url.to_string());
        if let Some(url) = url {
            if n >= 4 && blank(n - 2) && rule(n - 3) && blank(n - 4) {
                return (strip(n - 4), Some(url));
            }
            if rule(n - 2) && blank(n - 3) {
                return (strip(n - 3), Some(url));
            }
        }
    }

    if let Some((_, url)) = regex_captures!(
        r"^<!-- Synced with (https://gist\.github\.com/[a-f0-9]+(?:/[a-f0-9]+)?)",
        last
    ) {
        return (strip(n - 1), Some(url.to_string()));
    }

    (body.to_string(), None)
}

/// Normalise `https://gist.github.com/[user/]{id}[/{rev}]` to the id form.
fn canonical_gist_link(gist_url: &str) -> String {
    let Some((_, path)) = regex_captures!(r"gist\.github\.com/([^\s?#]+)", gist_url) else {
        return gist_url.to_string();
    };
    fn is_hex(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let rest = match segments.first() {
        Some(first) if is_hex(first) => &segments[..],
        _ => segments.get(1..).unwrap_or_default(),
    };
    match rest {
        [id] if is_hex(id) => gist_page_url(id, None),
        [id, revision, ..] if is_hex(id) && is_hex(revision) => gist_page_url(id, Some(*revision)),
        _ => gist_url.to_string(),
    }
}

/// Replace any existing footer with one pointing at `gist_url`.
pub fn add_gist_footer(body: &str, gist_url: &str, visible: bool) -> String {
    let (body, _) = extract_gist_footer(body);
    let footer = if visible {
        format!(
            "\n---\n\nSynced with [gist]({}) via [ghpr]({GHPR_URL})",
            canonical_gist_link(gist_url)
        )
    } else {
        format!("<!-- Synced with {gist_url} via [ghpr]({GHPR_URL}) -->")
    };
    if body.is_empty() {
        footer
    } else {
        format!("{body}\n\n{footer}")
    }
}

/// Gist id in a gist URL or remote URL (`gist.github.com[:/]{id}`).
pub fn gist_id_from_url(url: &str) -> Option<String> {
    regex_captures!(r"gist\.github\.com[:/]([a-f0-9]{20,32})", url).map(|(_, id)| id.to_string())
}

pub fn is_gist_url(url: &str) -> bool {
    regex_is_match!(r"gist\.github\.com", url)
}

pub fn gist_page_url(id: &str, revision: Option<&str>) -> String {
    match revision {
        Some(rev) => format!("https://gist.github.com/{id}/{rev}"),
        None => format!("https://gist.github.com/{id}"),
    }
}
