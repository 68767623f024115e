// ===== TRADE RECONSTRUCTION =====
//
// Trade types plus the normalizer that turns a confirmed transaction
// into at most one trade for a watched wallet.

pub mod normalizer;
pub mod types;

pub use normalizer::normalize;
pub use types::{TradeLeg, TradeRecord, TradeSide};
