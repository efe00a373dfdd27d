//! UV remapping of baked quads into a cropped atlas tile.

use glassmesh_core::{BakedQuad, ConnectivityData, Sprite, VertexFormat, VertexFormatError};

use crate::CroppedSprite;

/// Scale from a normalized sprite coordinate to cropped-tile local units.
pub const TILE_SCALE: f32 = 2.0;

/// Rewrite the texture coordinates of every vertex in `vertices`.
///
/// Each UV is normalized against `source` and placed at
/// `(tile + normalized) * TILE_SCALE` in `target`'s tile units (see
/// [`CroppedSprite::tile_u`]). All other
/// attributes are left untouched. Trailing words that do not form a full
/// vertex are ignored.
pub fn remap_vertex_uvs(
    vertices: &mut [u32],
    [tile_u, tile_v]: [u32; 2],
    source: &dyn Sprite,
    target: &CroppedSprite,
    format: &VertexFormat,
) -> Result<(), VertexFormatError> {
    let uv = format.uv_word_offset()?;
    let stride = format.stride_words();

    for vertex in vertices.chunks_exact_mut(stride) {
        let u = normalize(f32::from_bits(vertex[uv]), source.u0(), source.u1());
        vertex[uv] = target.tile_u((tile_u as f32 + u) * TILE_SCALE).to_bits();

        let v = normalize(f32::from_bits(vertex[uv + 1]), source.v0(), source.v1());
        vertex[uv + 1] = target.tile_v((tile_v as f32 + v) * TILE_SCALE).to_bits();
    }
    Ok(())
}

fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span.abs() <= f32::EPSILON {
        0.0
    } else {
        (value - min) / span
    }
}

/// Copy of `quad` with its UVs moved into tile `tile` of its cropped sprite.
///
/// The source quad is never modified.
pub fn remap_quad_to_tile(quad: &BakedQuad, tile: [u32; 2]) -> Result<BakedQuad, VertexFormatError> {
    let mut vertices = quad.vertices().to_vec();
    let sprite = quad.sprite().as_ref();
    let cropped = CroppedSprite::new(sprite);
    remap_vertex_uvs(&mut vertices, tile, sprite, &cropped, quad.format())?;
    Ok(quad.with_vertices(vertices))
}

/// Per-quad transform applied by [`crate::ConnectedModel`] on a cache miss.
///
/// Returning `Ok(None)` drops the quad from the result.
pub trait QuadRemapper: Send + Sync {
    /// Transform one quad given the block's connectivity payload, if any.
    fn remap(
        &self,
        quad: &BakedQuad,
        connectivity: Option<&ConnectivityData>,
    ) -> Result<Option<BakedQuad>, VertexFormatError>;
}

/// Maps every quad onto the first tile of its sprite.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerTileRemapper;

impl QuadRemapper for CornerTileRemapper {
    fn remap(
        &self,
        quad: &BakedQuad,
        _connectivity: Option<&ConnectivityData>,
    ) -> Result<Option<BakedQuad>, VertexFormatError> {
        remap_quad_to_tile(quad, [0, 0]).map(Some)
    }
}

impl<F> QuadRemapper for F
where
    F: Fn(&BakedQuad, Option<&ConnectivityData>) -> Result<Option<BakedQuad>, VertexFormatError>
        + Send
        + Sync,
{
    fn remap(
        &self,
        quad: &BakedQuad,
        connectivity: Option<&ConnectivityData>,
    ) -> Result<Option<BakedQuad>, VertexFormatError> {
        self(quad, connectivity)
    }
}
