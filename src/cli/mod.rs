//! CLI module - command implementations for `rdbq`

pub mod commands;
