pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(about = "Add data on one peer, cat it from another, under injected latency")]
pub struct Args {
    /// Path to the config file (defaults to ~/.weft/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
