//! Errors raised by the GitHub adapters.

use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to get GitHub token: {0}")]
    TokenError(String),

    #[error("{}", describe_api_error(.0))]
    ApiError(#[from] octocrab::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed (HTTP {status})")]
    DownloadFailed { url: String, status: u16 },

    #[error("Created item has no URL in response")]
    MissingHtmlUrl,
}

/// GitHub's message, status and per-field validation errors when present.
fn describe_api_error(err: &octocrab::Error) -> String {
    let octocrab::Error::GitHub { source, .. } = err else {
        return format!("GitHub API error: {err}");
    };
    let mut msg = format!(
        "GitHub API error: {} (HTTP {})",
        source.message,
        source.status_code.as_u16()
    );
    let fields = source
        .errors
        .as_deref()
        .map(validation_summary)
        .unwrap_or_default();
    if !fields.is_empty() {
        msg.push_str(&format!(" [{fields}]"));
    }
    msg
}

/// `field is code` for each entry of a 422 `errors` array.
fn validation_summary(errors: &[serde_json::Value]) -> String {
    errors
        .iter()
        .filter_map(|entry| {
            let field = entry.get("field").and_then(serde_json::Value::as_str);
            let code = entry.get("code").and_then(serde_json::Value::as_str);
            match (field, code) {
                (Some(field), Some(code)) => Some(format!("{field} is {code}")),
                (one, other) => one.or(other).map(str::to_string),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
