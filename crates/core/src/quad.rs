//! Baked quads.

use std::sync::Arc;

use blake3::Hasher;

use crate::{AtlasSprite, BlockVertex, Direction, VertexFormat};

/// Immutable quad list shared between a model's cache and its callers.
pub type QuadList = Arc<[BakedQuad]>;

/// A textured quad ready for chunk meshing.
///
/// Vertex data is packed into 32-bit words laid out per [`VertexFormat`].
/// Quads are never mutated once built; transforms produce new quads.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedQuad {
    vertices: Box<[u32]>,
    tint_index: Option<u32>,
    direction: Direction,
    sprite: Arc<AtlasSprite>,
    shade: bool,
    format: Arc<VertexFormat>,
}

impl BakedQuad {
    /// Construct a quad from packed vertex words.
    pub fn new(
        vertices: Vec<u32>,
        tint_index: Option<u32>,
        direction: Direction,
        sprite: Arc<AtlasSprite>,
        shade: bool,
        format: Arc<VertexFormat>,
    ) -> Self {
        Self {
            vertices: vertices.into_boxed_slice(),
            tint_index,
            direction,
            sprite,
            shade,
            format,
        }
    }

    /// Construct a quad in the [`VertexFormat::block`] layout.
    pub fn from_block_vertices(
        vertices: &[BlockVertex; 4],
        tint_index: Option<u32>,
        direction: Direction,
        sprite: Arc<AtlasSprite>,
        shade: bool,
    ) -> Self {
        Self::new(
            BlockVertex::pack(vertices),
            tint_index,
            direction,
            sprite,
            shade,
            VertexFormat::block(),
        )
    }

    /// Copy of this quad carrying different vertex data.
    pub fn with_vertices(&self, vertices: Vec<u32>) -> Self {
        Self {
            vertices: vertices.into_boxed_slice(),
            tint_index: self.tint_index,
            direction: self.direction,
            sprite: Arc::clone(&self.sprite),
            shade: self.shade,
            format: Arc::clone(&self.format),
        }
    }

    /// Packed vertex words.
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Tint slot sampled by colour handlers, if any.
    pub fn tint_index(&self) -> Option<u32> {
        self.tint_index
    }

    /// Face the quad belongs to.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sprite the quad samples.
    pub fn sprite(&self) -> &Arc<AtlasSprite> {
        &self.sprite
    }

    /// Whether directional shading applies.
    pub fn shade(&self) -> bool {
        self.shade
    }

    /// Layout of the vertex data.
    pub fn format(&self) -> &Arc<VertexFormat> {
        &self.format
    }

    /// Texture coordinates of each vertex, if the format has usable UVs.
    pub fn uvs(&self) -> Option<Vec<[f32; 2]>> {
        let offset = self.format.uv_word_offset().ok()?;
        let stride = self.format.stride_words();
        Some(
            self.vertices
                .chunks_exact(stride)
                .map(|v| [f32::from_bits(v[offset]), f32::from_bits(v[offset + 1])])
                .collect(),
        )
    }
}

/// Digest of a quad list's vertex data, used for determinism comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuadDigest(pub [u8; 32]);

impl QuadDigest {
    /// Hash every quad's vertex words, direction and tint in order.
    pub fn of(quads: &[BakedQuad]) -> Self {
        let mut hasher = Hasher::new();
        for quad in quads {
            hasher.update(&[quad.direction.index() as u8]);
            hasher.update(&quad.tint_index.map_or(-1i64, i64::from).to_le_bytes());
            hasher.update(bytemuck::cast_slice::<u32, u8>(&quad.vertices[..]));
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> BakedQuad {
        let sprite = Arc::new(AtlasSprite::from_pixels("glass", [0, 0], [16, 16], [64, 64]));
        let v = |x: f32, y: f32, u: f32, vv: f32| BlockVertex::new([x, y, 0.0], [u, vv], [0, 0, -1]);
        BakedQuad::from_block_vertices(
            &[
                v(1.0, 1.0, 0.0, 0.0),
                v(1.0, 0.0, 0.0, 0.25),
                v(0.0, 0.0, 0.25, 0.25),
                v(0.0, 1.0, 0.25, 0.0),
            ],
            None,
            Direction::North,
            sprite,
            true,
        )
    }

    #[test]
    fn uvs_read_back_from_packed_data() {
        let uvs = quad().uvs().expect("block format has uvs");
        assert_eq!(uvs, vec![[0.0, 0.0], [0.0, 0.25], [0.25, 0.25], [0.25, 0.0]]);
    }

    #[test]
    fn with_vertices_keeps_metadata() {
        let original = quad();
        let copy = original.with_vertices(vec![0; original.vertices().len()]);
        assert_eq!(copy.direction(), original.direction());
        assert_eq!(copy.tint_index(), original.tint_index());
        assert_eq!(copy.shade(), original.shade());
        assert!(Arc::ptr_eq(copy.sprite(), original.sprite()));
        assert!(Arc::ptr_eq(copy.format(), original.format()));
        assert_ne!(copy.vertices(), original.vertices());
    }

    #[test]
    fn digest_tracks_vertex_changes() {
        let a = quad();
        let b = a.with_vertices(vec![0; a.vertices().len()]);
        assert_eq!(QuadDigest::of(&[a.clone()]), QuadDigest::of(&[a.clone()]));
        assert_ne!(QuadDigest::of(&[a]), QuadDigest::of(&[b]));
    }
}
