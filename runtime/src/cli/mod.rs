//! CLI subcommand implementations for the api-inspector binary.

pub mod analyze_cmd;
pub mod cache_cmd;
pub mod doctor;
pub mod output;
pub mod try_cmd;
