// ===== TOKEN METADATA =====
//
// Mint decode, Metaplex metadata decode, static registry fallback and
// the bounded cache sitting in front of all three.

pub mod cache;
pub mod registry;
pub mod resolver;
pub mod types;

pub use cache::MetadataCache;
pub use resolver::{MetadataResolver, TokenResolver, METADATA_PROGRAM_ID};
pub use types::{assemble_metadata, DescriptiveFields, MintFields, TokenMetadata};
