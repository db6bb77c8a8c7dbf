//! CLI argument definitions using the clap derive API.
//!
//! Argument names, aliases, help text and value enums live here and nowhere
//! else. No business logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name     = "regen",
    bin_name = "regen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Incrementally regenerate derived source files from templates",
    long_about = "regen keeps generated files in sync with template definitions. \
                  Saving a definition re-renders every consumer; changing a source \
                  file re-renders only that file.",
    after_help = "EXAMPLES:\n\
        \x20 regen list .\n\
        \x20 regen render path/to/solution\n\
        \x20 regen render . --template src/Core/models.tst\n\
        \x20 regen watch . -v\n\
        \x20 regen completions bash > /usr/share/bash-completion/completions/regen",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the template definitions of a solution.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Render every consumer of every template (or of one template).
    #[command(
        visible_alias = "r",
        after_help = "EXAMPLES:\n\
            \x20 regen render .\n\
            \x20 regen render . --template src/Core/models.tst"
    )]
    Render(RenderArgs),

    /// Watch a solution and re-render as files change. Stop with Ctrl-C.
    #[command(visible_alias = "w")]
    Watch(WatchArgs),

    /// Generate shell completion scripts.
    #[command(after_help = "EXAMPLES:\n\
            \x20 regen completions bash > ~/.local/share/bash-completion/completions/regen\n\
            \x20 regen completions zsh  > ~/.zfunc/_regen\n\
            \x20 regen completions fish > ~/.config/fish/completions/regen.fish")]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 regen config get generator.consumer_scope\n\
            \x20 regen config list\n\
            \x20 regen config path"
    )]
    Config(ConfigCommands),
}

/// Solution location shared by the solution-level commands.
#[derive(Debug, Clone, Args)]
pub struct SolutionArg {
    /// Solution directory or `regen.toml` manifest.
    #[arg(value_name = "SOLUTION", default_value = ".")]
    pub solution: PathBuf,
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub solution: SolutionArg,

    #[arg(long = "format", value_enum, default_value = "table", help = "Listing format")]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    /// One definition path per line.
    List,
    Json,
}

// ── render ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub solution: SolutionArg,

    /// Only render the consumers of this definition file.
    #[arg(short = 't', long = "template", value_name = "PATH")]
    pub template: Option<PathBuf>,
}

// ── watch ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub solution: SolutionArg,

    /// Override `watch.poll_interval_ms`.
    #[arg(long = "interval", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Render everything once before watching.
    #[arg(long = "initial")]
    pub initial: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value.
    Get {
        /// Dotted key path, e.g. `watch.poll_interval_ms`.
        key: String,
    },
    /// Print the whole effective configuration as TOML.
    List,
    /// Print the configuration file location.
    Path,
}
