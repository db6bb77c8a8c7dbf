//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod list;
pub mod render;
pub mod watch;
