//! Local data model of a cloned issue or PR.

pub mod comment;
pub mod config;
pub mod description;
mod error;
pub mod locate;
pub mod spec;

pub use config::ItemConfig;
pub use error::ItemError;
pub use spec::{ItemKind, ItemRef, ItemSpec};
