//! Command-line arguments and per-module debug flags.

use clap::Parser;
use once_cell::sync::OnceCell;

#[derive(Debug, Clone, Parser, Default)]
#[command(name = "swapwatch", about = "Solana wallet swap monitor")]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    pub config: String,

    /// Suppress everything except errors
    #[arg(long)]
    pub quiet: bool,

    /// Enable debug logging for a module (repeatable): rpc, stream,
    /// watcher, trade, tokens, telegram, db, or "all"
    #[arg(long = "debug", value_name = "MODULE")]
    pub debug: Vec<String>,
}

static ARGS: OnceCell<Args> = OnceCell::new();

/// Parse process arguments. Call once from main before logging starts.
/// Exits with a usage message on invalid input.
pub fn init() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}

/// Current arguments. Falls back to defaults when `init` was never
/// called (unit tests, library embedding).
pub fn get() -> &'static Args {
    ARGS.get_or_init(|| Args::try_parse().unwrap_or_default())
}

pub fn is_quiet_enabled() -> bool {
    get().quiet
}

pub fn is_debug_enabled(module: &str) -> bool {
    get().debug.iter().any(|m| m == module || m == "all")
}

pub fn config_path() -> &'static str {
    &get().config
}
