use colored::*;

/// Subsystem tags for log output and per-module debug gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Rpc,
    Stream,
    Watcher,
    Trade,
    Tokens,
    Telegram,
    Db,
}

impl LogTag {
    /// Flag suffix used for --debug-<module> arguments.
    pub fn as_flag(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Rpc => "rpc",
            LogTag::Stream => "stream",
            LogTag::Watcher => "watcher",
            LogTag::Trade => "trade",
            LogTag::Tokens => "tokens",
            LogTag::Telegram => "telegram",
            LogTag::Db => "db",
        }
    }

    pub fn colored_label(&self) -> ColoredString {
        match self {
            LogTag::System => "SYSTEM".green().bold(),
            LogTag::Config => "CONFIG".cyan().bold(),
            LogTag::Rpc => "RPC".bright_green().bold(),
            LogTag::Stream => "STREAM".bright_blue().bold(),
            LogTag::Watcher => "WATCHER".magenta().bold(),
            LogTag::Trade => "TRADE".bright_yellow().bold(),
            LogTag::Tokens => "TOKENS".cyan().bold(),
            LogTag::Telegram => "TELEGRAM".blue().bold(),
            LogTag::Db => "DB".bright_blue().bold(),
        }
    }
}
