//! Adapters for the external systems: git and GitHub.

pub mod git;
pub mod github;
