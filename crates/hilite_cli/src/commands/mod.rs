//! Subcommand implementations

pub mod check;
pub mod init;
pub mod tree;
