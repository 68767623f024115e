// ===== SWAPWATCH =====
//
// Wallet swap monitor for Solana: subscribes to logs for watched
// wallets, classifies swap transactions by platform fingerprint,
// reconstructs the trade from pre/post token balances and delivers
// alerts over Telegram.

pub mod arguments;
pub mod config;
pub mod errors;
pub mod logger;
pub mod platforms;
pub mod reconcile;
pub mod rpc;
pub mod telegram;
pub mod tokens;
pub mod trades;
pub mod watcher;
pub mod watchlist;
