//! Telegram delivery of trade alerts.
//!
//! One bot instance fans a formatted alert out to every configured
//! chat. A failed delivery to one chat is logged and does not block the
//! others; the call fails only when no chat accepted the message.

use crate::errors::WatchError;
use crate::logger::{self, log, LogTag};
use crate::trades::{TradeRecord, TradeSide};
use crate::watcher::TradeSink;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_ids: &[i64]) -> Result<Self, WatchError> {
        if bot_token.is_empty() {
            return Err(WatchError::config("telegram bot token is empty"));
        }
        if chat_ids.is_empty() {
            return Err(WatchError::config("no telegram chat ids configured"));
        }

        Ok(Self {
            bot: Bot::new(bot_token),
            chat_ids: chat_ids.iter().map(|id| ChatId(*id)).collect(),
        })
    }

    pub async fn send_message(&self, chat_id: ChatId, message: &str) -> Result<(), WatchError> {
        self.bot
            .send_message(chat_id, message)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await
            .map_err(|e| WatchError::Telegram {
                message: format!("send to {} failed: {}", chat_id, e),
            })?;

        logger::debug(
            LogTag::Telegram,
            "SENT",
            &format!("chat={} length={}", chat_id, message.len()),
        );
        Ok(())
    }

    /// Broadcast to all configured chats. Succeeds if at least one
    /// delivery went through.
    pub async fn broadcast(&self, message: &str) -> Result<(), WatchError> {
        let mut delivered = 0usize;

        for chat_id in &self.chat_ids {
            match self.send_message(*chat_id, message).await {
                Ok(()) => delivered += 1,
                Err(e) => log(LogTag::Telegram, "SEND_FAILED", &e.to_string()),
            }
        }

        if delivered == 0 {
            return Err(WatchError::Telegram {
                message: "alert reached no chat".to_string(),
            });
        }
        Ok(())
    }
}

/// HTML alert for one reconstructed trade.
pub fn format_trade_alert(trade: &TradeRecord) -> String {
    let emoji = match trade.side {
        TradeSide::Buy => "🟢",
        TradeSide::Sell => "🔴",
    };

    let mut lines = vec![
        format!(
            "{} <b>{}</b> on <b>{}</b>",
            emoji,
            trade.side.label(),
            trade.platform.name()
        ),
        String::new(),
        format!(
            "👛 Wallet: <code>{}</code>",
            truncate_address(&trade.targeted_wallet)
        ),
        format!(
            "➖ Sent: <b>{} {}</b>",
            format_amount(trade.leg_out.amount),
            trade.leg_out.token.display_symbol()
        ),
        format!(
            "➕ Received: <b>{} {}</b>",
            format_amount(trade.leg_in.amount),
            trade.leg_in.token.display_symbol()
        ),
    ];

    if let Some(name) = traded_token_name(trade) {
        lines.push(format!("🪙 Token: {}", name));
    }

    lines.push(format!(
        "🕒 {}",
        trade.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!(
        "🔗 <a href=\"https://solscan.io/tx/{}\">View on Solscan</a>",
        trade.signature
    ));

    lines.join("\n")
}

/// Name of the non-quote leg, the token the wallet actually traded.
fn traded_token_name(trade: &TradeRecord) -> Option<String> {
    let token = match trade.side {
        TradeSide::Buy => &trade.leg_in.token,
        TradeSide::Sell => &trade.leg_out.token,
    };
    token.name.clone()
}

fn format_amount(amount: f64) -> String {
    if amount >= 1.0 {
        format!("{:.4}", amount)
    } else {
        format!("{:.6}", amount)
    }
}

fn truncate_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    match (address.get(..4), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{}...{}", head, tail),
        _ => address.to_string(),
    }
}

#[async_trait]
impl TradeSink for TelegramNotifier {
    async fn deliver(&self, trade: &TradeRecord) -> Result<(), WatchError> {
        self.broadcast(&format_trade_alert(trade)).await
    }
}
