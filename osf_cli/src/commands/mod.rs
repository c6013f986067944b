//! CLI subcommand implementations.

pub mod files;
pub mod preprints;
pub mod providers;
