use serde::Serialize;

/// Resolved token metadata: numeric fields decoded from the mint
/// account, descriptive fields from the Metaplex metadata account or
/// the static registry. Descriptive fields stay `None` when no source
/// knew them - they are never fabricated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMetadata {
    pub mint: String,
    pub decimals: u8,
    /// Total supply in UI units (raw supply / 10^decimals).
    pub supply: f64,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: bool,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub icon_uri: Option<String>,
}

impl TokenMetadata {
    /// Symbol for display, falling back to a shortened mint address.
    pub fn display_symbol(&self) -> String {
        match &self.symbol {
            Some(symbol) => symbol.clone(),
            None => match self.mint.get(..8) {
                Some(prefix) if self.mint.len() > 8 => format!("{}…", prefix),
                _ => self.mint.clone(),
            },
        }
    }
}

/// Numeric half of the metadata, decoded from raw mint account bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MintFields {
    pub decimals: u8,
    pub raw_supply: u64,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: bool,
}

/// Descriptive half, from the metadata account or registry.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveFields {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub icon_uri: Option<String>,
}

/// Merge the two halves. The numeric side always comes from the mint
/// account; a missing descriptive side leaves name/symbol unresolved.
pub fn assemble_metadata(
    mint: &str,
    fields: &MintFields,
    descriptive: Option<DescriptiveFields>,
) -> TokenMetadata {
    let (name, symbol, icon_uri) = match descriptive {
        Some(d) => (d.name, d.symbol, d.icon_uri),
        None => (None, None, None),
    };

    TokenMetadata {
        mint: mint.to_string(),
        decimals: fields.decimals,
        supply: fields.raw_supply as f64 / 10f64.powi(fields.decimals as i32),
        mint_authority: fields.mint_authority.clone(),
        freeze_authority: fields.freeze_authority.clone(),
        is_initialized: fields.is_initialized,
        name,
        symbol,
        icon_uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_only_metadata_keeps_descriptive_fields_unresolved() {
        let fields = MintFields {
            decimals: 6,
            raw_supply: 1_000_000_000,
            mint_authority: None,
            freeze_authority: None,
            is_initialized: true,
        };

        let metadata = assemble_metadata("SomeMint1111111111111111111111111111111111", &fields, None);
        assert_eq!(metadata.decimals, 6);
        assert!(metadata.is_initialized);
        assert_eq!(metadata.supply, 1_000.0);
        assert_eq!(metadata.name, None);
        assert_eq!(metadata.symbol, None);
        assert_eq!(metadata.display_symbol(), "SomeMint…");
    }
}
