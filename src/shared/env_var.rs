//! Centralized reader for the environment variables ghpr looks at.
//!
//! Environment variable names are defined as private constants here;
//! external code accesses values through the `EnvVars` struct.

const INGEST_ATTACHMENTS: &str = "GHPR_INGEST_ATTACHMENTS";
const INGEST_BRANCH: &str = "GHPR_INGEST_BRANCH";
const LOG: &str = "GHPR_LOG";
const SHELL: &str = "SHELL";

/// Snapshot of the relevant environment variables at load time.
#[derive(Debug, Default)]
pub struct EnvVars {
    /// `Some(false)` when `GHPR_INGEST_ATTACHMENTS=0`; `None` when unset.
    pub ingest_attachments: Option<bool>,

    /// Branch override for attachment ingestion.
    pub ingest_branch: Option<String>,

    /// Log filter directive (EnvFilter syntax).
    pub log: Option<String>,

    /// Login shell path, used to pick a shell for `shell-integration`.
    pub shell: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

impl EnvVars {
    /// Read the variables from the current process.
    pub fn load() -> Self {
        Self {
            ingest_attachments: non_empty_var(INGEST_ATTACHMENTS).map(|v| v != "0"),
            ingest_branch: non_empty_var(INGEST_BRANCH),
            log: non_empty_var(LOG),
            shell: non_empty_var(SHELL),
        }
    }
}
