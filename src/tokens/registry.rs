//! Static mainnet token registry.
//!
//! Fallback descriptive metadata for well-known tokens whose mints
//! predate the Metaplex metadata program or whose metadata account is
//! missing. Chain-scoped: mainnet-beta only.

use super::types::DescriptiveFields;

pub struct RegistryEntry {
    pub mint: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub icon_uri: Option<&'static str>,
}

pub static MAINNET_REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        mint: "So11111111111111111111111111111111111111112",
        name: "Wrapped SOL",
        symbol: "SOL",
        icon_uri: Some(
            "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/So11111111111111111111111111111111111111112/logo.png",
        ),
    },
    RegistryEntry {
        mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        name: "USD Coin",
        symbol: "USDC",
        icon_uri: Some(
            "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v/logo.png",
        ),
    },
    RegistryEntry {
        mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
        name: "USDT",
        symbol: "USDT",
        icon_uri: None,
    },
    RegistryEntry {
        mint: "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R",
        name: "Raydium",
        symbol: "RAY",
        icon_uri: None,
    },
    RegistryEntry {
        mint: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
        name: "Bonk",
        symbol: "BONK",
        icon_uri: None,
    },
    RegistryEntry {
        mint: "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",
        name: "Jupiter",
        symbol: "JUP",
        icon_uri: None,
    },
];

pub fn lookup(mint: &str) -> Option<DescriptiveFields> {
    MAINNET_REGISTRY
        .iter()
        .find(|entry| entry.mint == mint)
        .map(|entry| DescriptiveFields {
            name: Some(entry.name.to_string()),
            symbol: Some(entry.symbol.to_string()),
            icon_uri: entry.icon_uri.map(str::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mint_resolves() {
        let usdc = lookup("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap();
        assert_eq!(usdc.symbol.as_deref(), Some("USDC"));
    }

    #[test]
    fn unknown_mint_misses() {
        assert!(lookup("UnknownMint111111111111111111111111111111111").is_none());
    }
}
