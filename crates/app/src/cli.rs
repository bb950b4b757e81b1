//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

/// Fire named HTTP requests from `.hit` definition files.
///
/// Definitions are loaded from every `*.hit` file in the working
/// directory. Positional values are addressable from definitions as
/// `@1`, `@2`, … and fields of previously cached JSON responses as
/// `@requestId.field`.
#[derive(Parser, Debug)]
#[command(name = "quiver", version)]
pub struct Cli {
    /// Request to execute, e.g. `@createUser`.
    pub request: String,

    /// Positional values substituted for `@1`, `@2`, … references.
    pub args: Vec<String>,

    /// Print the outbound request before sending it.
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory to load `*.hit` files from.
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,
}
