use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wrapped SOL, USDC and USDT: the default quote set for deciding
/// trade side (wallet paying with a quote asset is buying).
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    #[serde(default)]
    pub rpc_fallbacks: Vec<String>,
    pub ws_url: String,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Chat ids that receive trade alerts in addition to stored
    /// subscribers.
    #[serde(default)]
    pub chat_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Wallets to track at startup, merged into the persistent store.
    #[serde(default)]
    pub wallets: Vec<String>,
    /// Concurrent fetch/classify pipelines allowed per wallet.
    pub max_pipelines_per_wallet: usize,
    /// Mints treated as the quote side when deriving buy/sell.
    pub quote_mints: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wallets: vec![],
            max_pipelines_per_wallet: 4,
            quote_mints: vec![
                WSOL_MINT.to_string(),
                USDC_MINT.to_string(),
                USDT_MINT.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Upper bound on cached token metadata entries.
    pub cache_capacity: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "watchlist.db".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            rpc_fallbacks: vec![],
            ws_url: "wss://api.mainnet-beta.solana.com/".to_string(),
            telegram: TelegramConfig::default(),
            watch: WatchConfig::default(),
            metadata: MetadataConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            anyhow::bail!(
                "No config found - wrote defaults to {}. Fill in telegram.bot_token and restart.",
                path
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            anyhow::bail!("rpc_url is required in config");
        }
        if self.ws_url.is_empty() {
            anyhow::bail!("ws_url is required in config");
        }
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!("telegram.bot_token is required in config");
        }
        if self.watch.max_pipelines_per_wallet == 0 {
            anyhow::bail!("watch.max_pipelines_per_wallet must be at least 1");
        }
        if self.metadata.cache_capacity == 0 {
            anyhow::bail!("metadata.cache_capacity must be at least 1");
        }
        Ok(())
    }
}
