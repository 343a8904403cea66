//! Gist mirroring: the body footer, the gist remote, syncing and attachments.

pub mod attachments;
pub mod footer;
pub mod remote;
pub mod sync;
