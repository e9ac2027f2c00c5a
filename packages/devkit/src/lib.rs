//! Developer tooling for devkit projects, used by its CLI.

pub mod claude;
pub mod snippet;
