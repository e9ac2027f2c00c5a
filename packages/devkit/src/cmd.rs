//! CLI subcommands.

pub mod claude;
