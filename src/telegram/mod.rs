// ===== TELEGRAM =====

pub mod notifier;

pub use notifier::{format_trade_alert, TelegramNotifier};
