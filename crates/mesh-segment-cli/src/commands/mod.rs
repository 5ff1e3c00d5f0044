//! Subcommand implementations.

pub mod extent;
pub mod info;
pub mod init_config;
pub mod segment;
