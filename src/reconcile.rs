//! Balance-delta reconciliation.
//!
//! Economic amounts are reconstructed from the pre/post token balance
//! snapshots the node attaches to every transaction, never from any
//! program's log format. Each (account, mint) pair that changed yields
//! one signed delta; the trade normalizer decides which deltas matter.

use crate::rpc::TokenBalance;
use serde::Serialize;

/// One (account, pre|post) token balance observation.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub account_index: u8,
    pub owner: Option<String>,
    pub mint: String,
    pub raw_amount: u64,
    pub decimals: u8,
}

impl BalanceSnapshot {
    /// A snapshot whose raw amount does not parse is dropped rather
    /// than defaulted: a zero stand-in would synthesize a full-balance
    /// delta out of corrupt node data.
    pub fn from_balance(balance: &TokenBalance) -> Option<Self> {
        let raw_amount = balance.ui_token_amount.amount.parse().ok()?;

        Some(Self {
            account_index: balance.account_index,
            owner: balance.owner.clone(),
            mint: balance.mint.clone(),
            raw_amount,
            decimals: balance.ui_token_amount.decimals,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeltaDirection {
    /// The owner received the token (post > pre).
    In,
    /// The owner gave the token up (post < pre).
    Out,
}

/// Signed balance change for one token account across a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDelta {
    pub mint: String,
    pub owner: Option<String>,
    pub raw_delta: i128,
    pub decimals: u8,
    pub direction: DeltaDirection,
}

impl BalanceDelta {
    /// Magnitude in UI units (raw / 10^decimals).
    pub fn ui_amount(&self) -> f64 {
        self.raw_delta.unsigned_abs() as f64 / 10f64.powi(self.decimals as i32)
    }

    pub fn owned_by(&self, wallet: &str) -> bool {
        self.owner.as_deref() == Some(wallet)
    }
}

/// Pair pre and post snapshots by (account index, mint) and emit one
/// delta per changed pair, in pre-snapshot order. Zero deltas carry no
/// trade information and are dropped. Accounts appearing only in the
/// post set (token accounts created inside the transaction) produce no
/// delta; swaps paying out into a fresh account are therefore not
/// reconciled.
// TODO: decide whether post-only accounts should synthesize a zero pre
// amount instead of being skipped.
pub fn reconcile(pre: &[BalanceSnapshot], post: &[BalanceSnapshot]) -> Vec<BalanceDelta> {
    let mut deltas = Vec::new();

    for pre_snapshot in pre {
        let matching_post = post.iter().find(|p| {
            p.account_index == pre_snapshot.account_index && p.mint == pre_snapshot.mint
        });

        let post_snapshot = match matching_post {
            Some(snapshot) => snapshot,
            // Account reassigned to another mint or closed without a
            // post entry: no pair, no delta.
            None => continue,
        };

        let raw_delta = post_snapshot.raw_amount as i128 - pre_snapshot.raw_amount as i128;
        if raw_delta == 0 {
            continue;
        }

        deltas.push(BalanceDelta {
            mint: pre_snapshot.mint.clone(),
            owner: pre_snapshot.owner.clone(),
            raw_delta,
            decimals: pre_snapshot.decimals,
            direction: if raw_delta > 0 {
                DeltaDirection::In
            } else {
                DeltaDirection::Out
            },
        });
    }

    deltas
}
