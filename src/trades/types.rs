use crate::platforms::PlatformId;
use crate::reconcile::DeltaDirection;
use crate::tokens::TokenMetadata;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// One side of a swap: the token, which way it moved for the targeted
/// wallet, and the amount in UI units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLeg {
    pub token: TokenMetadata,
    pub direction: DeltaDirection,
    pub amount: f64,
}

/// A fully reconstructed swap for one watched wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub targeted_wallet: String,
    /// Leg the wallet gave up.
    pub leg_out: TradeLeg,
    /// Leg the wallet received.
    pub leg_in: TradeLeg,
    pub side: TradeSide,
    pub platform: PlatformId,
    pub timestamp: DateTime<Utc>,
    pub signature: String,
}

impl TradeRecord {
    /// One-line rendering for log output.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {:.6} {} -> {:.6} {} on {} ({})",
            crate::logger::short_address(&self.targeted_wallet),
            self.side.label(),
            self.leg_out.amount,
            self.leg_out.token.display_symbol(),
            self.leg_in.amount,
            self.leg_in.token.display_symbol(),
            self.platform.name(),
            self.signature.get(..16).unwrap_or(&self.signature),
        )
    }
}
