//! Structured error types for the monitoring core.
//!
//! The taxonomy mirrors how failures are handled, not where they occur:
//! recoverable data gaps map to skip results at the normalizer boundary,
//! transport problems stay inside the watch coordinator, and only
//! configuration errors are allowed to stop startup.

use std::fmt;

#[derive(Debug, Clone)]
pub enum WatchError {
    /// The mint account for a token does not exist on chain.
    MintNotFound { mint: String },

    /// Neither a metadata account nor a registry entry exists for the
    /// token. Recoverable at the trade-normalizer boundary.
    MetadataUnavailable { mint: String },

    /// Log stream or fetch layer failure. Logged and retried by the
    /// watch coordinator, never propagated past it.
    Subscription { wallet: String, message: String },

    /// RPC transport or decoding failure.
    Rpc { message: String },

    /// Watch-list store failure.
    Database { message: String },

    /// Telegram delivery failure. Alerts are fire-and-forget; the
    /// trade itself is already logged by then.
    Telegram { message: String },

    /// Invalid configuration, surfaced before services start.
    Config { message: String },
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::MintNotFound { mint } => {
                write!(f, "Mint account not found for {}", mint)
            }
            WatchError::MetadataUnavailable { mint } => {
                write!(f, "No metadata source for token {}", mint)
            }
            WatchError::Subscription { wallet, message } => {
                write!(f, "Subscription error for {}: {}", wallet, message)
            }
            WatchError::Rpc { message } => write!(f, "RPC error: {}", message),
            WatchError::Database { message } => write!(f, "Database error: {}", message),
            WatchError::Telegram { message } => write!(f, "Telegram error: {}", message),
            WatchError::Config { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for WatchError {}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        WatchError::Rpc {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Rpc {
            message: format!("JSON decode failed: {}", err),
        }
    }
}

impl From<rusqlite::Error> for WatchError {
    fn from(err: rusqlite::Error) -> Self {
        WatchError::Database {
            message: err.to_string(),
        }
    }
}

impl WatchError {
    pub fn rpc(message: impl Into<String>) -> Self {
        WatchError::Rpc {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        WatchError::Config {
            message: message.into(),
        }
    }
}
