//! DEX platform fingerprints and swap classification.
//!
//! Transaction logs on Solana are free text emitted by on-chain
//! programs; there is no schema to parse. Classification is therefore
//! substring containment against a static fingerprint table, evaluated
//! uniformly for every platform. When more than one fingerprint matches
//! the same transaction, the first platform in registration order wins -
//! a deliberate tie-break, not an error.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlatformId {
    Raydium,
    Jupiter,
    Orca,
    Meteora,
    PumpFun,
    FluxBeam,
    DexLab,
}

impl PlatformId {
    pub fn name(&self) -> &'static str {
        match self {
            PlatformId::Raydium => "Raydium",
            PlatformId::Jupiter => "Jupiter",
            PlatformId::Orca => "Orca",
            PlatformId::Meteora => "Meteora",
            PlatformId::PumpFun => "PumpFun",
            PlatformId::FluxBeam => "FluxBeam",
            PlatformId::DexLab => "DexLab",
        }
    }
}

/// Static pattern attributing log output to one exchange program.
pub struct PlatformFingerprint {
    pub platform: PlatformId,
    /// Substrings that mark a swap by this platform. A program invoke
    /// line alone is not a swap signal: the same programs emit invokes
    /// for deposits, withdrawals and account housekeeping.
    pub log_markers: &'static [&'static str],
    /// On-chain program id, matched as a log substring (invoke lines
    /// quote it verbatim). Consulted only for marker-less platforms.
    pub program_id: Option<&'static str>,
}

pub const RAYDIUM_AMM_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
pub const JUPITER_V6_PROGRAM_ID: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
pub const ORCA_WHIRLPOOL_PROGRAM_ID: &str = "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc";
pub const METEORA_DLMM_PROGRAM_ID: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo";
pub const PUMP_FUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
pub const FLUXBEAM_PROGRAM_ID: &str = "FLUXubRmkEi2q6K3Y9kBPg9248ggaZVsoSFhtJHSrm1X";
pub const DEXLAB_PROGRAM_ID: &str = "DSwpgjMvXhtGn6BsbqmacdBZyfLj6jSWf3HJpdJtmg6N";

/// Registration order doubles as match priority.
pub static PLATFORM_FINGERPRINTS: &[PlatformFingerprint] = &[
    PlatformFingerprint {
        platform: PlatformId::Raydium,
        log_markers: &["Program log: Instruction: Swap", "ray_log:"],
        program_id: Some(RAYDIUM_AMM_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::Jupiter,
        log_markers: &[
            "Program log: Instruction: Route",
            "Program log: Instruction: SharedAccountsRoute",
        ],
        program_id: Some(JUPITER_V6_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::Orca,
        log_markers: &["Program log: Instruction: SwapV2"],
        program_id: Some(ORCA_WHIRLPOOL_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::Meteora,
        log_markers: &["Program log: Instruction: Swap2"],
        program_id: Some(METEORA_DLMM_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::PumpFun,
        log_markers: &[
            "Program log: Instruction: Buy",
            "Program log: Instruction: Sell",
        ],
        program_id: Some(PUMP_FUN_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::FluxBeam,
        log_markers: &[],
        program_id: Some(FLUXBEAM_PROGRAM_ID),
    },
    PlatformFingerprint {
        platform: PlatformId::DexLab,
        log_markers: &[],
        program_id: Some(DEXLAB_PROGRAM_ID),
    },
];

/// DexLab emits no explicit swap marker; its swaps surface as generic
/// token-program transfers under its program id. Detection for that
/// shape is best-effort.
const GENERIC_TRANSFER_MARKER: &str = "Program log: Instruction: Transfer";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapClassification {
    pub is_swap: bool,
    pub platform: Option<PlatformId>,
}

impl SwapClassification {
    pub const NOT_A_SWAP: SwapClassification = SwapClassification {
        is_swap: false,
        platform: None,
    };
}

/// Decide whether a transaction's logs describe a swap, and by which
/// platform. A miss is the frequent, expected case for watched wallets.
pub fn classify(log_lines: &[String]) -> SwapClassification {
    for fingerprint in PLATFORM_FINGERPRINTS {
        if fingerprint_matches(fingerprint, log_lines) {
            return SwapClassification {
                is_swap: true,
                platform: Some(fingerprint.platform),
            };
        }
    }

    SwapClassification::NOT_A_SWAP
}

fn fingerprint_matches(fingerprint: &PlatformFingerprint, log_lines: &[String]) -> bool {
    if !fingerprint.log_markers.is_empty() {
        return log_lines.iter().any(|line| {
            fingerprint
                .log_markers
                .iter()
                .any(|marker| line.contains(marker))
        });
    }

    // Marker-less platforms: their program id plus a generic transfer
    // log is the only swap signal available.
    let program_seen = fingerprint
        .program_id
        .map(|id| log_lines.iter().any(|line| line.contains(id)))
        .unwrap_or(false);

    program_seen
        && log_lines
            .iter()
            .any(|line| line.contains(GENERIC_TRANSFER_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unregistered_logs_are_not_a_swap() {
        let logs = lines(&[
            "Program 11111111111111111111111111111111 invoke [1]",
            "Program log: Instruction: CreateAccount",
            "Program 11111111111111111111111111111111 success",
        ]);
        assert_eq!(classify(&logs), SwapClassification::NOT_A_SWAP);
    }

    #[test]
    fn empty_logs_are_not_a_swap() {
        assert_eq!(classify(&[]), SwapClassification::NOT_A_SWAP);
    }

    #[test]
    fn raydium_swap_marker_classifies() {
        let logs = lines(&[
            "Program 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8 invoke [1]",
            "Program log: Instruction: Swap",
        ]);
        let result = classify(&logs);
        assert!(result.is_swap);
        assert_eq!(result.platform, Some(PlatformId::Raydium));
    }

    #[test]
    fn jupiter_route_marker_classifies() {
        let logs = lines(&[
            "Program JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4 invoke [1]",
            "Program log: Instruction: Route",
        ]);
        let result = classify(&logs);
        assert!(result.is_swap);
        assert_eq!(result.platform, Some(PlatformId::Jupiter));
    }

    #[test]
    fn program_invoke_without_marker_is_not_a_swap() {
        // A bare invoke can be anything the program does.
        let logs = lines(&[
            "Program JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4 invoke [1]",
        ]);
        assert_eq!(classify(&logs), SwapClassification::NOT_A_SWAP);
    }

    #[test]
    fn add_liquidity_is_not_a_swap() {
        let logs = lines(&[
            "Program 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8 invoke [1]",
            "Program log: Instruction: Deposit",
        ]);
        assert_eq!(classify(&logs), SwapClassification::NOT_A_SWAP);
    }

    #[test]
    fn multi_match_takes_first_registered_platform() {
        // Raydium marker and Jupiter program id in the same transaction
        // (an aggregator routing through an AMM): registration order wins.
        let logs = lines(&[
            "Program JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4 invoke [1]",
            "Program log: Instruction: Swap",
        ]);
        let result = classify(&logs);
        assert_eq!(result.platform, Some(PlatformId::Raydium));
    }

    #[test]
    fn dexlab_transfer_heuristic() {
        let logs = lines(&[
            "Program DSwpgjMvXhtGn6BsbqmacdBZyfLj6jSWf3HJpdJtmg6N invoke [1]",
            "Program log: Instruction: Transfer",
        ]);
        let result = classify(&logs);
        assert!(result.is_swap);
        assert_eq!(result.platform, Some(PlatformId::DexLab));
    }

    #[test]
    fn dexlab_program_without_transfer_is_not_a_swap() {
        let logs = lines(&[
            "Program DSwpgjMvXhtGn6BsbqmacdBZyfLj6jSWf3HJpdJtmg6N invoke [1]",
            "Program log: Instruction: Initialize",
        ]);
        assert!(!classify(&logs).is_swap);
    }
}
