use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AssetError;

/// The sixteen dye colours every glass type is offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DyeColor {
    /// White.
    White,
    /// Orange.
    Orange,
    /// Magenta.
    Magenta,
    /// Light blue.
    LightBlue,
    /// Yellow.
    Yellow,
    /// Lime.
    Lime,
    /// Pink.
    Pink,
    /// Gray.
    Gray,
    /// Light gray.
    LightGray,
    /// Cyan.
    Cyan,
    /// Purple.
    Purple,
    /// Blue.
    Blue,
    /// Brown.
    Brown,
    /// Green.
    Green,
    /// Red.
    Red,
    /// Black.
    Black,
}

impl DyeColor {
    /// All colours in dye order.
    pub const ALL: [DyeColor; 16] = [
        DyeColor::White,
        DyeColor::Orange,
        DyeColor::Magenta,
        DyeColor::LightBlue,
        DyeColor::Yellow,
        DyeColor::Lime,
        DyeColor::Pink,
        DyeColor::Gray,
        DyeColor::LightGray,
        DyeColor::Cyan,
        DyeColor::Purple,
        DyeColor::Blue,
        DyeColor::Brown,
        DyeColor::Green,
        DyeColor::Red,
        DyeColor::Black,
    ];

    /// Lowercase identifier used in block names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Orange => "orange",
            Self::Magenta => "magenta",
            Self::LightBlue => "light_blue",
            Self::Yellow => "yellow",
            Self::Lime => "lime",
            Self::Pink => "pink",
            Self::Gray => "gray",
            Self::LightGray => "light_gray",
            Self::Cyan => "cyan",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Brown => "brown",
            Self::Green => "green",
            Self::Red => "red",
            Self::Black => "black",
        }
    }
}

/// A family of connecting glass blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassType {
    /// Identifier, e.g. "borderless_glass".
    pub name: String,
    /// Whether the uncoloured block is tinted (translucent).
    #[serde(default)]
    pub tinted: bool,
    /// Whether the family has pane variants.
    #[serde(default)]
    pub has_panes: bool,
}

impl GlassType {
    /// Construct a glass type.
    pub fn new(name: &str, tinted: bool, has_panes: bool) -> Self {
        Self {
            name: name.to_string(),
            tinted,
            has_panes,
        }
    }

    /// Built-in connecting glass families.
    pub fn builtin() -> Vec<GlassType> {
        vec![
            GlassType::new("clear_glass", false, true),
            GlassType::new("scratched_glass", false, true),
            GlassType::new("borderless_glass", false, true),
            GlassType::new("tinted_borderless_glass", true, false),
        ]
    }
}

/// Parse a JSON list of glass types.
pub fn glass_types_from_str(input: &str) -> Result<Vec<GlassType>, AssetError> {
    let types: Vec<GlassType> = serde_json::from_str(input)?;
    let mut seen = HashSet::new();
    for ty in &types {
        if ty.name.trim().is_empty() {
            return Err(AssetError::Invalid("glass type with empty name".into()));
        }
        if !seen.insert(ty.name.as_str()) {
            return Err(AssetError::Invalid(format!(
                "duplicate glass type '{}'",
                ty.name
            )));
        }
    }
    Ok(types)
}

/// Load glass types from a JSON file.
pub fn glass_types_from_file(path: &Path) -> Result<Vec<GlassType>, AssetError> {
    let data = fs::read_to_string(path)?;
    glass_types_from_str(&data)
}
