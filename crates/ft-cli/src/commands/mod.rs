//! CLI subcommand implementations.

pub mod pause;
pub mod resume;
pub mod start;
pub mod status;
pub mod stop;
pub mod summary;
mod util;
