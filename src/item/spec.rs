//! Item references: `owner/repo#N`, kinds and user-supplied specs.

use std::fmt;

use lazy_regex::regex_captures;

use super::error::ItemError;

/// Whether an item is a pull request or an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Pr,
    Issue,
}

impl ItemKind {
    /// Human label used in messages and commit subjects.
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Pr => "PR",
            ItemKind::Issue => "issue",
        }
    }

    /// Value stored under `pr.type`.
    pub fn config_value(self) -> &'static str {
        match self {
            ItemKind::Pr => "pr",
            ItemKind::Issue => "issue",
        }
    }

    pub fn from_config_value(value: &str) -> Option<Self> {
        match value {
            "pr" => Some(ItemKind::Pr),
            "issue" => Some(ItemKind::Issue),
            _ => None,
        }
    }

    /// Path segment in github.com URLs.
    pub fn url_segment(self) -> &'static str {
        match self {
            ItemKind::Pr => "pull",
            ItemKind::Issue => "issues",
        }
    }

    pub fn from_pull_request_flag(is_pull_request: bool) -> Self {
        if is_pull_request {
            ItemKind::Pr
        } else {
            ItemKind::Issue
        }
    }
}

/// A GitHub issue or PR, identified by repository and number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl ItemRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    pub fn html_url(&self, kind: ItemKind) -> String {
        format!(
            "https://github.com/{}/{}/{}/{}",
            self.owner,
            self.repo,
            kind.url_segment(),
            self.number
        )
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// A parsed command-line item spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSpec {
    /// Fully qualified; the kind is known only when parsed from a URL.
    Qualified {
        item: ItemRef,
        kind: Option<ItemKind>,
    },
    /// A bare number; owner and repo come from the surrounding repository.
    Number(u64),
}

impl ItemSpec {
    pub fn parse(spec: &str) -> Result<Self, ItemError> {
        let spec = spec.trim();
        let invalid = || ItemError::InvalidSpec(spec.to_string());

        if let Some((_, owner, repo, segment, number)) = regex_captures!(
            r"^https://github\.com/([^/]+)/([^/]+)/(pull|issues)/(\d+)",
            spec
        ) {
            let kind = if segment == "pull" {
                ItemKind::Pr
            } else {
                ItemKind::Issue
            };
            return Ok(ItemSpec::Qualified {
                item: ItemRef::new(owner, repo, number.parse().map_err(|_| invalid())?),
                kind: Some(kind),
            });
        }

        if let Some((_, owner, repo, number)) = regex_captures!(r"^([^/]+)/([^#]+)#(\d+)$", spec)
        {
            return Ok(ItemSpec::Qualified {
                item: ItemRef::new(owner, repo, number.parse().map_err(|_| invalid())?),
                kind: None,
            });
        }

        if !spec.is_empty() && spec.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(ItemSpec::Number(spec.parse().map_err(|_| invalid())?));
        }

        Err(invalid())
    }
}

/// Title from a description's first line.
///
/// Strips a leading `# [ref]` or `# [ref](url)`; otherwise just the leading
/// `#`s.
pub fn extract_title(first_line: &str) -> String {
    let line = first_line.trim();
    if let Some((_, _, title)) = regex_captures!(r"^#\s*\[([^\]]+)\](?:\([^)]+\))?\s*(.*)$", line)
    {
        return title.trim().to_string();
    }
    line.trim_start_matches('#').trim().to_string()
}
