//! Argument parsing for the `reaper` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reaper", version, about = "Destroy every resource in an AWS account except what's excluded")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan an account, print what would be destroyed, and — with
    /// `--no-dry-run` — actually destroy it.
    Destroy(DestroyArgs),
}

#[derive(Parser, Debug)]
pub struct DestroyArgs {
    /// Path to the YAML configuration document.
    #[arg(long)]
    pub config: PathBuf,

    /// The account block to apply (a key under `accounts:`, or
    /// `__default__` when omitted).
    #[arg(long, default_value = "__default__")]
    pub account: String,

    /// Actually issue deletes. Without this flag, reaper only scans and
    /// prints — the default is always a dry run.
    #[arg(long)]
    pub no_dry_run: bool,

    /// Restrict the run to these kinds (repeatable). Composed with the
    /// config file's targets, not a replacement for them.
    #[arg(long = "target")]
    pub targets: Vec<String>,

    /// Exclude these kinds from the run (repeatable), on top of the
    /// config file's excludes.
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Suppress printing items that were filtered out.
    #[arg(long)]
    pub quiet: bool,

    /// Abort if an item is still `waiting`/`pending` after this many
    /// sweeps with no `new` work left to issue. 0 disables the check.
    #[arg(long, default_value_t = 0)]
    pub max_wait_retries: u32,
}
