//! CLI subcommand implementations.

pub mod delete;
pub mod describe;
pub mod rename;
pub mod size;
pub mod start;
pub mod stop;
pub mod summary;
pub mod util;
