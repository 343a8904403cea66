pub mod config;
pub mod diff;
pub mod dirs;
pub mod env_var;
