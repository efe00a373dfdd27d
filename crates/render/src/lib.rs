#![warn(missing_docs)]
//! Connected-glass model decoration: cropped atlas sprites, per-quad UV
//! remapping, and a concurrent per-model quad cache.

mod cache;
mod connected;
mod cropped;
mod cube;
mod overrides;
mod remap;
mod variants;

pub use cache::{QuadCache, QuadCacheStats};
pub use connected::ConnectedModel;
pub use cropped::{CroppedSprite, CROPPED_UNITS, CROP_DIVISOR};
pub use cube::{block_display_transform, CubeModel};
pub use overrides::{prewarm, BakedModels, ModelOverrides, OverrideFactory};
pub use remap::{
    remap_quad_to_tile, remap_vertex_uvs, CornerTileRemapper, QuadRemapper, TILE_SCALE,
};
pub use variants::{
    enumerate_variants, render_type_for, BlockKind, GlassVariant, RenderType, TINTED_GLASS,
};
