//! Vertex format descriptions.
//!
//! Quads carry their vertices as packed 32-bit words. A [`VertexFormat`] is the
//! ordered list of attributes inside one vertex; it is only consulted to find
//! where the texture coordinates live and how far apart vertices are.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scalar type of one attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 32-bit float.
    Float,
    /// Unsigned byte.
    UByte,
    /// Signed byte.
    Byte,
    /// Unsigned 16-bit integer.
    UShort,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 32-bit integer.
    UInt,
    /// Signed 32-bit integer.
    Int,
}

impl ElementType {
    /// Size of one component in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Float | Self::UInt | Self::Int => 4,
            Self::UShort | Self::Short => 2,
            Self::UByte | Self::Byte => 1,
        }
    }
}

/// What an attribute is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementUsage {
    /// Vertex position.
    Position,
    /// Vertex colour.
    Color,
    /// Texture coordinates. Index 0 samples the block atlas, index 2 the lightmap.
    Uv(u8),
    /// Vertex normal.
    Normal,
    /// Alignment padding.
    Padding,
}

/// One attribute slot of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexElement {
    /// Attribute role.
    pub usage: ElementUsage,
    /// Component scalar type.
    pub kind: ElementType,
    /// Number of components.
    pub count: u8,
}

impl VertexElement {
    /// Construct an element.
    pub const fn new(usage: ElementUsage, kind: ElementType, count: u8) -> Self {
        Self { usage, kind, count }
    }

    /// Total size of the attribute in bytes.
    pub const fn byte_size(&self) -> usize {
        self.kind.size() * self.count as usize
    }
}

/// Reasons a vertex format cannot be used for UV remapping.
///
/// These indicate a broken asset: the quad cannot be remapped and the model
/// that produced it must not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VertexFormatError {
    /// No texture-coordinate attribute is present.
    #[error("expected vertex format to have a UV attribute")]
    MissingUv,
    /// The texture-coordinate attribute is not floating point.
    #[error("expected UV attribute to have data type float, found {found:?}")]
    NonFloatUv {
        /// Type found in the format.
        found: ElementType,
    },
    /// The texture-coordinate attribute has fewer than two components.
    #[error("expected UV attribute to have at least 2 components, found {components}")]
    UvTooNarrow {
        /// Component count found in the format.
        components: u8,
    },
    /// The texture-coordinate attribute does not start on a word boundary.
    #[error("UV attribute at byte offset {offset} is not word aligned")]
    MisalignedUv {
        /// Byte offset of the attribute.
        offset: usize,
    },
}

/// Ordered attribute layout of one vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexFormat {
    elements: Vec<VertexElement>,
}

impl VertexFormat {
    /// Construct a format from its ordered elements.
    pub fn new(elements: Vec<VertexElement>) -> Self {
        Self { elements }
    }

    /// Attributes in vertex order.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Size of one vertex in bytes.
    pub fn byte_size(&self) -> usize {
        self.elements.iter().map(VertexElement::byte_size).sum()
    }

    /// Size of one vertex in 32-bit words, i.e. the stride of packed vertex data.
    pub fn stride_words(&self) -> usize {
        self.byte_size() / 4
    }

    /// Byte offset of the element at `index`.
    pub fn offset(&self, index: usize) -> usize {
        self.elements[..index.min(self.elements.len())]
            .iter()
            .map(VertexElement::byte_size)
            .sum()
    }

    /// Word offset of the texture coordinates within one vertex.
    ///
    /// The first `Uv` attribute is used. It must be a float attribute with at
    /// least two components starting on a word boundary.
    pub fn uv_word_offset(&self) -> Result<usize, VertexFormatError> {
        let (index, element) = self
            .elements
            .iter()
            .enumerate()
            .find(|(_, el)| matches!(el.usage, ElementUsage::Uv(_)))
            .ok_or(VertexFormatError::MissingUv)?;
        if element.kind != ElementType::Float {
            return Err(VertexFormatError::NonFloatUv {
                found: element.kind,
            });
        }
        if element.count < 2 {
            return Err(VertexFormatError::UvTooNarrow {
                components: element.count,
            });
        }
        let offset = self.offset(index);
        if offset % 4 != 0 {
            return Err(VertexFormatError::MisalignedUv { offset });
        }
        Ok(offset / 4)
    }

    /// Layout used by baked block quads; matches [`BlockVertex`].
    pub fn block() -> Arc<VertexFormat> {
        static BLOCK: OnceLock<Arc<VertexFormat>> = OnceLock::new();
        BLOCK
            .get_or_init(|| {
                Arc::new(VertexFormat::new(vec![
                    VertexElement::new(ElementUsage::Position, ElementType::Float, 3),
                    VertexElement::new(ElementUsage::Color, ElementType::UByte, 4),
                    VertexElement::new(ElementUsage::Uv(0), ElementType::Float, 2),
                    VertexElement::new(ElementUsage::Uv(2), ElementType::Short, 2),
                    VertexElement::new(ElementUsage::Normal, ElementType::Byte, 3),
                    VertexElement::new(ElementUsage::Padding, ElementType::Byte, 1),
                ]))
            })
            .clone()
    }
}

/// Packed vertex matching [`VertexFormat::block`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockVertex {
    /// Position in block-local coordinates.
    pub position: [f32; 3],
    /// RGBA colour.
    pub color: [u8; 4],
    /// Atlas texture coordinates.
    pub uv: [f32; 2],
    /// Packed block/sky light.
    pub light: [i16; 2],
    /// Face normal.
    pub normal: [i8; 3],
    /// Keeps the vertex word aligned.
    pub padding: i8,
}

impl BlockVertex {
    /// White, unlit vertex at `position` sampling `uv`.
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [i8; 3]) -> Self {
        Self {
            position,
            color: [0xFF; 4],
            uv,
            light: [0; 2],
            normal,
            padding: 0,
        }
    }

    /// Reinterpret vertices as the packed word layout stored on quads.
    pub fn pack(vertices: &[BlockVertex]) -> Vec<u32> {
        bytemuck::cast_slice(vertices).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_format_matches_packed_vertex() {
        let format = VertexFormat::block();
        assert_eq!(format.byte_size(), std::mem::size_of::<BlockVertex>());
        assert_eq!(format.stride_words(), 8);
        assert_eq!(format.uv_word_offset(), Ok(4));
    }

    #[test]
    fn missing_uv_is_rejected() {
        let format = VertexFormat::new(vec![
            VertexElement::new(ElementUsage::Position, ElementType::Float, 3),
            VertexElement::new(ElementUsage::Color, ElementType::UByte, 4),
        ]);
        assert_eq!(format.uv_word_offset(), Err(VertexFormatError::MissingUv));
    }

    #[test]
    fn integer_uv_is_rejected() {
        let format = VertexFormat::new(vec![
            VertexElement::new(ElementUsage::Position, ElementType::Float, 3),
            VertexElement::new(ElementUsage::Uv(0), ElementType::Short, 2),
        ]);
        assert_eq!(
            format.uv_word_offset(),
            Err(VertexFormatError::NonFloatUv {
                found: ElementType::Short
            })
        );
    }

    #[test]
    fn single_component_uv_is_rejected() {
        let format = VertexFormat::new(vec![VertexElement::new(
            ElementUsage::Uv(0),
            ElementType::Float,
            1,
        )]);
        assert_eq!(
            format.uv_word_offset(),
            Err(VertexFormatError::UvTooNarrow { components: 1 })
        );
    }

    #[test]
    fn unaligned_uv_is_rejected() {
        let format = VertexFormat::new(vec![
            VertexElement::new(ElementUsage::Color, ElementType::UByte, 3),
            VertexElement::new(ElementUsage::Uv(0), ElementType::Float, 2),
        ]);
        assert_eq!(
            format.uv_word_offset(),
            Err(VertexFormatError::MisalignedUv { offset: 3 })
        );
    }

    #[test]
    fn pack_preserves_uv_bits() {
        let vertex = BlockVertex::new([1.0, 2.0, 3.0], [0.25, 0.75], [0, 1, 0]);
        let words = BlockVertex::pack(&[vertex]);
        assert_eq!(words.len(), 8);
        assert_eq!(f32::from_bits(words[4]), 0.25);
        assert_eq!(f32::from_bits(words[5]), 0.75);
    }
}
