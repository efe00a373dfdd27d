#![warn(missing_docs)]
//! Asset schema + validation helpers: atlas metadata and glass type lists.

mod atlas;
mod glass;

pub use atlas::{AtlasError, TextureAtlasMetadata};
pub use glass::{glass_types_from_file, glass_types_from_str, DyeColor, GlassType};

use thiserror::Error;

/// Errors emitted during asset loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading assets.
    #[error("failed to read asset file: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse asset file: {0}")]
    Parse(#[from] serde_json::Error),
    /// Structurally valid JSON describing inconsistent content.
    #[error("invalid asset definition: {0}")]
    Invalid(String),
}
