#![warn(missing_docs)]
//! Engine-facing primitives for baked block models: faces, vertex formats,
//! atlas sprites, quads and the [`BakedModel`] capability interface.

mod direction;
mod model;
mod quad;
mod sprite;
mod vertex;

pub use direction::{Direction, Directions};
pub use model::{
    BakedModel, BlockState, CameraTransform, ConnectivityData, ConnectivitySignature,
    ModelData, ModelError, ModelProperty,
};
pub use quad::{BakedQuad, QuadDigest, QuadList};
pub use sprite::{AtlasSprite, Sprite, SPRITE_UNITS};
pub use vertex::{
    BlockVertex, ElementType, ElementUsage, VertexElement, VertexFormat, VertexFormatError,
};
