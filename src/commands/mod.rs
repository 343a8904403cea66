pub mod clone;
pub mod common;
pub mod config;
pub mod create;
pub mod diff;
pub mod ingest_attachments;
pub mod init;
pub mod open;
pub mod pull;
pub mod push;
pub mod shell_integration;
pub mod show;
pub mod upload;

#[cfg(test)]
mod test_helpers;
