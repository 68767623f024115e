//! Transaction-to-trade normalization.
//!
//! Turns a fetched transaction into at most one `TradeRecord` for the
//! targeted wallet. Returning `None` is the dominant path: most
//! transactions touching a watched wallet are transfers, account
//! housekeeping or swaps that did not move the wallet's own balances.
//! Only resolver failures are logged; structural misses stay silent at
//! the default log level.

use super::types::{TradeLeg, TradeRecord, TradeSide};
use crate::logger::{self, LogTag};
use crate::platforms;
use crate::reconcile::{self, BalanceDelta, BalanceSnapshot, DeltaDirection};
use crate::rpc::TransactionEnvelope;
use crate::tokens::TokenResolver;
use chrono::{TimeZone, Utc};

/// Reconstruct the wallet's trade from a confirmed transaction.
pub async fn normalize(
    tx: &TransactionEnvelope,
    wallet: &str,
    resolver: &dyn TokenResolver,
    quote_mints: &[String],
) -> Option<TradeRecord> {
    let signature = tx.signature()?.to_string();

    let meta = tx.meta.as_ref()?;
    if meta.err.is_some() {
        return None;
    }
    let logs = meta.log_messages.as_ref()?;
    let pre = meta.pre_token_balances.as_ref()?;
    let post = meta.post_token_balances.as_ref()?;

    let classification = platforms::classify(logs);
    let platform = classification.platform?;

    let pre_snapshots: Vec<BalanceSnapshot> =
        pre.iter().filter_map(BalanceSnapshot::from_balance).collect();
    let post_snapshots: Vec<BalanceSnapshot> =
        post.iter().filter_map(BalanceSnapshot::from_balance).collect();

    let wallet_deltas: Vec<BalanceDelta> = reconcile::reconcile(&pre_snapshots, &post_snapshots)
        .into_iter()
        .filter(|delta| delta.owned_by(wallet))
        .collect();

    let (leg_out_delta, leg_in_delta) = select_swap_pair(wallet_deltas)?;

    let out_token = match resolver.resolve(&leg_out_delta.mint).await {
        Ok(metadata) => metadata,
        Err(e) => {
            logger::log(
                LogTag::Trade,
                "RESOLVE_FAILED",
                &format!("{}: {}", signature, e),
            );
            return None;
        }
    };
    let in_token = match resolver.resolve(&leg_in_delta.mint).await {
        Ok(metadata) => metadata,
        Err(e) => {
            logger::log(
                LogTag::Trade,
                "RESOLVE_FAILED",
                &format!("{}: {}", signature, e),
            );
            return None;
        }
    };

    // The wallet spending a quote asset (SOL, USDC, USDT) means it was
    // buying the other leg; spending anything else is a sell into quote
    // or a token-to-token rotation, reported as a sell of the out leg.
    let side = if quote_mints.iter().any(|q| q == &leg_out_delta.mint) {
        TradeSide::Buy
    } else {
        TradeSide::Sell
    };

    let timestamp = tx
        .block_time
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now);

    Some(TradeRecord {
        targeted_wallet: wallet.to_string(),
        leg_out: TradeLeg {
            amount: leg_out_delta.ui_amount(),
            direction: DeltaDirection::Out,
            token: out_token,
        },
        leg_in: TradeLeg {
            amount: leg_in_delta.ui_amount(),
            direction: DeltaDirection::In,
            token: in_token,
        },
        side,
        platform,
        timestamp,
        signature,
    })
}

/// Pick the (out, in) legs from the wallet's deltas. Fewer than two
/// changes cannot form a swap. With more than two (multi-hop routes,
/// fee skims) the two largest magnitudes are taken as the economic
/// legs; the sort is stable so equal magnitudes keep snapshot order.
fn select_swap_pair(mut deltas: Vec<BalanceDelta>) -> Option<(BalanceDelta, BalanceDelta)> {
    if deltas.len() < 2 {
        return None;
    }

    deltas.sort_by(|a, b| b.raw_delta.unsigned_abs().cmp(&a.raw_delta.unsigned_abs()));
    deltas.truncate(2);

    let first = deltas.remove(0);
    let second = deltas.remove(0);

    match (first.direction, second.direction) {
        (DeltaDirection::Out, DeltaDirection::In) => Some((first, second)),
        (DeltaDirection::In, DeltaDirection::Out) => Some((second, first)),
        // Two inflows or two outflows is not an exchange of assets.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WatchError;
    use crate::platforms::PlatformId;
    use crate::tokens::TokenMetadata;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const TOKA: &str = "TokaMint1111111111111111111111111111111111111";
    const TOKB: &str = "TokbMint1111111111111111111111111111111111111";

    struct StaticResolver {
        tokens: HashMap<String, TokenMetadata>,
    }

    impl StaticResolver {
        fn with(entries: &[(&str, &str, u8)]) -> Self {
            let tokens = entries
                .iter()
                .map(|(mint, symbol, decimals)| {
                    (
                        mint.to_string(),
                        TokenMetadata {
                            mint: mint.to_string(),
                            decimals: *decimals,
                            supply: 0.0,
                            mint_authority: None,
                            freeze_authority: None,
                            is_initialized: true,
                            name: Some(symbol.to_string()),
                            symbol: Some(symbol.to_string()),
                            icon_uri: None,
                        },
                    )
                })
                .collect();
            Self { tokens }
        }
    }

    #[async_trait]
    impl TokenResolver for StaticResolver {
        async fn resolve(&self, mint: &str) -> Result<TokenMetadata, WatchError> {
            self.tokens
                .get(mint)
                .cloned()
                .ok_or_else(|| WatchError::MetadataUnavailable {
                    mint: mint.to_string(),
                })
        }
    }

    fn quote_mints() -> Vec<String> {
        vec![
            crate::config::WSOL_MINT.to_string(),
            crate::config::USDC_MINT.to_string(),
            crate::config::USDT_MINT.to_string(),
        ]
    }

    fn balance_json(index: u8, mint: &str, owner: &str, amount: u64, decimals: u8) -> String {
        format!(
            r#"{{ "accountIndex": {index}, "mint": "{mint}", "owner": "{owner}",
                 "uiTokenAmount": {{ "amount": "{amount}", "decimals": {decimals}, "uiAmount": null }} }}"#
        )
    }

    fn swap_tx(
        logs: &[&str],
        pre: &[String],
        post: &[String],
        block_time: Option<i64>,
    ) -> TransactionEnvelope {
        let logs_json: Vec<String> = logs.iter().map(|l| format!("\"{}\"", l)).collect();
        let block_time_json = match block_time {
            Some(t) => t.to_string(),
            None => "null".to_string(),
        };
        let raw = format!(
            r#"{{
                "slot": 1000,
                "blockTime": {block_time_json},
                "meta": {{
                    "err": null,
                    "logMessages": [{logs}],
                    "preTokenBalances": [{pre}],
                    "postTokenBalances": [{post}]
                }},
                "transaction": {{
                    "signatures": ["SwapSig111111111111111111111111111111111111111111111111111111111111111111111111111111111"],
                    "message": {{ "accountKeys": [] }}
                }}
            }}"#,
            logs = logs_json.join(","),
            pre = pre.join(","),
            post = post.join(","),
        );
        serde_json::from_str(&raw).unwrap()
    }

    const RAYDIUM_LOGS: &[&str] = &[
        "Program 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8 invoke [1]",
        "Program log: Instruction: Swap",
    ];

    #[tokio::test]
    async fn usdc_for_token_is_a_buy() {
        // Wallet spends 10 USDC, receives 0.05 TOKA.
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, TOKA, WALLET, 0, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, TOKA, WALLET, 50_000_000, 9),
            ],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6), (TOKA, "TOKA", 9)]);
        let trade = normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .unwrap();

        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.platform, PlatformId::Raydium);
        assert_eq!(trade.leg_out.token.mint, USDC);
        assert_eq!(trade.leg_out.amount, 10.0);
        assert_eq!(trade.leg_in.token.mint, TOKA);
        assert_eq!(trade.leg_in.amount, 0.05);
        assert_eq!(trade.timestamp.timestamp(), 1714000000);
        assert!(trade.signature.starts_with("SwapSig"));
    }

    #[tokio::test]
    async fn token_for_usdc_is_a_sell() {
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, TOKA, WALLET, 50_000_000, 9),
                balance_json(3, USDC, WALLET, 0, 6),
            ],
            &[
                balance_json(2, TOKA, WALLET, 0, 9),
                balance_json(3, USDC, WALLET, 9_500_000, 6),
            ],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6), (TOKA, "TOKA", 9)]);
        let trade = normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .unwrap();

        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.leg_out.token.mint, TOKA);
        assert_eq!(trade.leg_in.token.mint, USDC);
    }

    #[tokio::test]
    async fn non_swap_logs_yield_none() {
        let tx = swap_tx(
            &[
                "Program 11111111111111111111111111111111 invoke [1]",
                "Program log: Instruction: Transfer",
            ],
            &[balance_json(2, USDC, WALLET, 10_000_000, 6)],
            &[balance_json(2, USDC, WALLET, 0, 6)],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn add_liquidity_yields_no_trade() {
        // Deposit into a Raydium pool: program invoke but no swap
        // marker, wallet pays USDC and WSOL and receives LP tokens.
        let wsol = crate::config::WSOL_MINT;
        let lp = "LpMint11111111111111111111111111111111111111";
        let tx = swap_tx(
            &[
                "Program 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8 invoke [1]",
                "Program log: Instruction: Deposit",
            ],
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, wsol, WALLET, 5_000_000, 9),
                balance_json(4, lp, WALLET, 0, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, wsol, WALLET, 0, 9),
                balance_json(4, lp, WALLET, 1_000_000, 9),
            ],
            Some(1714000000),
        );

        let resolver =
            StaticResolver::with(&[(USDC, "USDC", 6), (wsol, "SOL", 9), (lp, "LP", 9)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn missing_meta_yields_none() {
        let raw = r#"{ "transaction": { "signatures": ["abc"] } }"#;
        let tx: TransactionEnvelope = serde_json::from_str(raw).unwrap();
        let resolver = StaticResolver::with(&[]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn single_delta_yields_none() {
        // Swap-shaped logs but only one balance change for the wallet:
        // someone else's swap that merely paid the wallet.
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[balance_json(2, TOKA, WALLET, 0, 9)],
            &[balance_json(2, TOKA, WALLET, 50_000_000, 9)],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(TOKA, "TOKA", 9)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn other_wallets_deltas_are_ignored() {
        let other = "OtherWallet11111111111111111111111111111111";
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, other, 10_000_000, 6),
                balance_json(3, TOKA, other, 0, 9),
            ],
            &[
                balance_json(2, USDC, other, 0, 6),
                balance_json(3, TOKA, other, 50_000_000, 9),
            ],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6), (TOKA, "TOKA", 9)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn multi_hop_takes_two_largest_legs() {
        // USDC out, TOKA in, plus a tiny intermediate TOKB dust change.
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, TOKA, WALLET, 0, 9),
                balance_json(4, TOKB, WALLET, 100, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, TOKA, WALLET, 50_000_000, 9),
                balance_json(4, TOKB, WALLET, 90, 9),
            ],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[
            (USDC, "USDC", 6),
            (TOKA, "TOKA", 9),
            (TOKB, "TOKB", 9),
        ]);
        let trade = normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .unwrap();

        assert_eq!(trade.leg_out.token.mint, USDC);
        assert_eq!(trade.leg_in.token.mint, TOKA);
    }

    #[tokio::test]
    async fn two_inflows_yield_none() {
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, TOKA, WALLET, 0, 9),
                balance_json(3, TOKB, WALLET, 0, 9),
            ],
            &[
                balance_json(2, TOKA, WALLET, 1_000, 9),
                balance_json(3, TOKB, WALLET, 2_000, 9),
            ],
            Some(1714000000),
        );

        let resolver = StaticResolver::with(&[(TOKA, "TOKA", 9), (TOKB, "TOKB", 9)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn resolver_failure_drops_the_trade() {
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, TOKA, WALLET, 0, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, TOKA, WALLET, 50_000_000, 9),
            ],
            Some(1714000000),
        );

        // TOKA missing from the resolver.
        let resolver = StaticResolver::with(&[(USDC, "USDC", 6)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn failed_transaction_yields_none() {
        let mut tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, TOKA, WALLET, 0, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, TOKA, WALLET, 50_000_000, 9),
            ],
            Some(1714000000),
        );
        tx.meta.as_mut().unwrap().err = Some(serde_json::json!({"InstructionError": [0, "Custom"]}));

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6), (TOKA, "TOKA", 9)]);
        assert!(normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn missing_block_time_falls_back_to_now() {
        let tx = swap_tx(
            RAYDIUM_LOGS,
            &[
                balance_json(2, USDC, WALLET, 10_000_000, 6),
                balance_json(3, TOKA, WALLET, 0, 9),
            ],
            &[
                balance_json(2, USDC, WALLET, 0, 6),
                balance_json(3, TOKA, WALLET, 50_000_000, 9),
            ],
            None,
        );

        let resolver = StaticResolver::with(&[(USDC, "USDC", 6), (TOKA, "TOKA", 9)]);
        let before = Utc::now();
        let trade = normalize(&tx, WALLET, &resolver, &quote_mints())
            .await
            .unwrap();
        assert!(trade.timestamp >= before);
    }
}
