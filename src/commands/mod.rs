//! Subcommand implementations

pub mod activity;
pub mod readme;
