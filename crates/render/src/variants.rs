//! Renderable glass block variants and their render types.

use std::fmt;

use glassmesh_assets::{DyeColor, GlassType};

/// Name of the standalone tinted glass block.
pub const TINTED_GLASS: &str = "tinted_glass";

/// Render pass a block is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderType {
    /// Alpha-tested with mipmaps.
    CutoutMipped,
    /// Alpha-blended.
    Translucent,
}

impl RenderType {
    /// Canonical string key used in logs/metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CutoutMipped => "cutout_mipped",
            Self::Translucent => "translucent",
        }
    }
}

/// Shape of a glass block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    /// Full block.
    Block,
    /// Thin pane.
    Pane,
}

/// One renderable block: a glass family, optional colour, and shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlassVariant {
    /// Glass family name.
    pub glass: String,
    /// Dye colour, `None` for the uncoloured block.
    pub color: Option<DyeColor>,
    /// Block or pane.
    pub kind: BlockKind,
}

impl GlassVariant {
    /// Uncoloured full block of `glass`.
    pub fn block(glass: &str) -> Self {
        Self {
            glass: glass.to_string(),
            color: None,
            kind: BlockKind::Block,
        }
    }

    /// Uncoloured pane of `glass`.
    pub fn pane(glass: &str) -> Self {
        Self {
            kind: BlockKind::Pane,
            ..Self::block(glass)
        }
    }

    /// The same variant dyed `color`.
    pub fn dyed(self, color: DyeColor) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }

    /// Registry name, e.g. `red_borderless_glass_pane`.
    pub fn block_name(&self) -> String {
        let mut name = String::new();
        if let Some(color) = self.color {
            name.push_str(color.as_str());
            name.push('_');
        }
        name.push_str(&self.glass);
        if self.kind == BlockKind::Pane {
            name.push_str("_pane");
        }
        name
    }

    /// Atlas entry sampled by the variant. Panes share their block's texture.
    pub fn sprite_name(&self) -> String {
        match self.color {
            Some(color) => format!("{}_{}", color.as_str(), self.glass),
            None => self.glass.clone(),
        }
    }
}

impl fmt::Display for GlassVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.block_name())
    }
}

/// Every block, pane and coloured variant of `types`, in registration order.
pub fn enumerate_variants(types: &[GlassType]) -> Vec<GlassVariant> {
    let mut variants = Vec::new();
    for ty in types {
        variants.push(GlassVariant::block(&ty.name));
        if ty.has_panes {
            variants.push(GlassVariant::pane(&ty.name));
        }
        for color in DyeColor::ALL {
            variants.push(GlassVariant::block(&ty.name).dyed(color));
            if ty.has_panes {
                variants.push(GlassVariant::pane(&ty.name).dyed(color));
            }
        }
    }
    variants
}

/// Render type of `variant` given its family.
///
/// Coloured variants are always translucent; uncoloured blocks are
/// translucent only for tinted families, and uncoloured panes never are.
pub fn render_type_for(ty: &GlassType, variant: &GlassVariant) -> RenderType {
    match (variant.color, variant.kind) {
        (Some(_), _) => RenderType::Translucent,
        (None, BlockKind::Block) if ty.tinted => RenderType::Translucent,
        (None, _) => RenderType::CutoutMipped,
    }
}
