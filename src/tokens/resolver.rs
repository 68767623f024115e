//! On-chain token metadata resolution.
//!
//! Numeric fields (decimals, supply, authorities, initialization) are
//! decoded from the mint account and never substituted from a fallback
//! source. Descriptive fields (name, symbol, icon) come from the
//! Metaplex metadata account derived for the mint, falling back to the
//! static registry. A token with neither descriptive source fails with
//! `MetadataUnavailable` and the trade that referenced it is dropped by
//! the caller.

use super::cache::MetadataCache;
use super::registry;
use super::types::{assemble_metadata, DescriptiveFields, MintFields, TokenMetadata};
use crate::errors::WatchError;
use crate::logger::{self, LogTag};
use crate::rpc::RpcClient;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Mint;
use std::str::FromStr;
use std::sync::Arc;

/// Metaplex token metadata program.
pub const METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

static METADATA_PROGRAM: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(METADATA_PROGRAM_ID).expect("static metadata program id")
});

/// Metadata lookup seam consumed by the trade normalizer.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    async fn resolve(&self, mint: &str) -> Result<TokenMetadata, WatchError>;
}

pub struct MetadataResolver {
    rpc: Arc<RpcClient>,
    cache: MetadataCache,
}

impl MetadataResolver {
    pub fn new(rpc: Arc<RpcClient>, cache_capacity: usize) -> Self {
        Self {
            rpc,
            cache: MetadataCache::new(cache_capacity),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl TokenResolver for MetadataResolver {
    async fn resolve(&self, mint: &str) -> Result<TokenMetadata, WatchError> {
        if let Some(cached) = self.cache.get(mint) {
            return Ok(cached);
        }

        let mint_pubkey = Pubkey::from_str(mint)
            .map_err(|e| WatchError::rpc(format!("invalid mint address {}: {}", mint, e)))?;

        let mint_data = self
            .rpc
            .get_account_data(mint)
            .await?
            .ok_or_else(|| WatchError::MintNotFound {
                mint: mint.to_string(),
            })?;
        let fields = decode_mint(&mint_data)?;

        let descriptive = match self.fetch_descriptive(&mint_pubkey).await? {
            Some(descriptive) => Some(descriptive),
            None => registry::lookup(mint),
        };

        let descriptive = descriptive.ok_or_else(|| WatchError::MetadataUnavailable {
            mint: mint.to_string(),
        })?;

        let metadata = assemble_metadata(mint, &fields, Some(descriptive));
        logger::debug(
            LogTag::Tokens,
            "RESOLVED",
            &format!(
                "{} decimals={} symbol={}",
                mint,
                metadata.decimals,
                metadata.symbol.as_deref().unwrap_or("?")
            ),
        );

        self.cache.insert(metadata.clone());
        Ok(metadata)
    }
}

impl MetadataResolver {
    async fn fetch_descriptive(
        &self,
        mint_pubkey: &Pubkey,
    ) -> Result<Option<DescriptiveFields>, WatchError> {
        let metadata_address = metadata_account_address(mint_pubkey);
        let account = self
            .rpc
            .get_account_data(&metadata_address.to_string())
            .await?;

        Ok(account.as_deref().and_then(decode_metadata_account))
    }
}

/// Deterministic Metaplex PDA for a mint: ["metadata", program, mint].
pub fn metadata_account_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", METADATA_PROGRAM.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM,
    )
    .0
}

/// Decode the numeric metadata half from raw mint account bytes.
pub fn decode_mint(data: &[u8]) -> Result<MintFields, WatchError> {
    if data.len() < Mint::LEN {
        return Err(WatchError::rpc(format!(
            "mint account too short: expected {}, got {}",
            Mint::LEN,
            data.len()
        )));
    }

    let mint = Mint::unpack(&data[..Mint::LEN])
        .map_err(|e| WatchError::rpc(format!("mint unpack failed: {}", e)))?;

    let mint_authority: Option<Pubkey> = mint.mint_authority.into();
    let freeze_authority: Option<Pubkey> = mint.freeze_authority.into();

    Ok(MintFields {
        decimals: mint.decimals,
        raw_supply: mint.supply,
        mint_authority: mint_authority.map(|p| p.to_string()),
        freeze_authority: freeze_authority.map(|p| p.to_string()),
        is_initialized: mint.is_initialized,
    })
}

/// Decode name/symbol/uri from a Metaplex metadata account. Layout:
/// key (1) | update authority (32) | mint (32) | three borsh strings.
/// Strings are NUL-padded to their reserved width.
pub fn decode_metadata_account(data: &[u8]) -> Option<DescriptiveFields> {
    let mut offset = 1 + 32 + 32;

    let name = read_borsh_string(data, &mut offset)?;
    let symbol = read_borsh_string(data, &mut offset)?;
    let uri = read_borsh_string(data, &mut offset)?;

    Some(DescriptiveFields {
        name: clean_padded(&name),
        symbol: clean_padded(&symbol),
        icon_uri: clean_padded(&uri),
    })
}

fn read_borsh_string(data: &[u8], offset: &mut usize) -> Option<String> {
    let len_bytes = data.get(*offset..*offset + 4)?;
    let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
    let bytes = data.get(*offset + 4..*offset + 4 + len)?;
    *offset += 4 + len;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

fn clean_padded(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::program_option::COption;

    fn packed_mint(decimals: u8, supply: u64, initialized: bool) -> Vec<u8> {
        let mint = Mint {
            mint_authority: COption::None,
            supply,
            decimals,
            is_initialized: initialized,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; Mint::LEN];
        Mint::pack(mint, &mut data).unwrap();
        data
    }

    #[test]
    fn decode_mint_round_trips_raw_bytes() {
        let data = packed_mint(6, 42_000_000, true);
        let fields = decode_mint(&data).unwrap();
        assert_eq!(fields.decimals, 6);
        assert_eq!(fields.raw_supply, 42_000_000);
        assert!(fields.is_initialized);
        assert_eq!(fields.mint_authority, None);
    }

    #[test]
    fn decode_mint_rejects_short_data() {
        assert!(decode_mint(&[0u8; 10]).is_err());
    }

    fn borsh_string(value: &str, padded_width: usize) -> Vec<u8> {
        let mut padded = value.as_bytes().to_vec();
        padded.resize(padded_width, 0);
        let mut out = (padded.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&padded);
        out
    }

    #[test]
    fn decode_metadata_account_trims_padding() {
        let mut data = vec![4u8]; // key
        data.extend_from_slice(&[1u8; 32]); // update authority
        data.extend_from_slice(&[2u8; 32]); // mint
        data.extend(borsh_string("Toka Coin", 32));
        data.extend(borsh_string("TOKA", 10));
        data.extend(borsh_string("https://example.com/toka.png", 200));

        let descriptive = decode_metadata_account(&data).unwrap();
        assert_eq!(descriptive.name.as_deref(), Some("Toka Coin"));
        assert_eq!(descriptive.symbol.as_deref(), Some("TOKA"));
        assert_eq!(
            descriptive.icon_uri.as_deref(),
            Some("https://example.com/toka.png")
        );
    }

    #[test]
    fn truncated_metadata_account_yields_none() {
        let data = vec![4u8; 40];
        assert!(decode_metadata_account(&data).is_none());
    }

    #[test]
    fn metadata_pda_is_deterministic() {
        let mint = Pubkey::new_unique();
        assert_eq!(metadata_account_address(&mint), metadata_account_address(&mint));
    }
}
