//! Cropped atlas sprite view.

use glassmesh_core::{Sprite, SPRITE_UNITS};

/// Each axis of a cropped sprite covers `1 / CROP_DIVISOR` of its source.
pub const CROP_DIVISOR: u32 = 8;

/// Span of the cropped region in the source sprite's local units.
pub const CROPPED_UNITS: f32 = SPRITE_UNITS / CROP_DIVISOR as f32;

const TILE_UNITS_PER_SPRITE_UNIT: f32 = CROPPED_UNITS / SPRITE_UNITS;

/// Read-only view of the top-left 1/8 x 1/8 tile of an atlas sprite.
///
/// The atlas dimensions are reconstructed from the source's pixel origin and
/// normalized edge (`round(x / u0)`), so the view answers coordinate queries
/// without access to the atlas itself.
///
/// As a [`Sprite`], local `0..SPRITE_UNITS` spans the cropped region. The
/// [`tile_u`](Self::tile_u)/[`tile_v`](Self::tile_v) pair instead keeps the
/// source sprite's scale, where the region covers `0..CROPPED_UNITS`.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedSprite {
    name: String,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    atlas_width: f32,
    atlas_height: f32,
    texels_per_unit_u: f32,
    texels_per_unit_v: f32,
}

impl CroppedSprite {
    /// Crop `source` to its top-left tile.
    pub fn new(source: &dyn Sprite) -> Self {
        let atlas_width = atlas_extent(
            source.x(),
            source.u0(),
            source.width(),
            source.u1() - source.u0(),
        );
        let atlas_height = atlas_extent(
            source.y(),
            source.v0(),
            source.height(),
            source.v1() - source.v0(),
        );
        Self {
            name: source.name().to_string(),
            x: source.x(),
            y: source.y(),
            width: source.width() / CROP_DIVISOR,
            height: source.height() / CROP_DIVISOR,
            atlas_width,
            atlas_height,
            texels_per_unit_u: source.width() as f32 / SPRITE_UNITS,
            texels_per_unit_v: source.height() as f32 / SPRITE_UNITS,
        }
    }

    /// Reconstructed atlas size in pixels.
    pub fn atlas_size(&self) -> [f32; 2] {
        [self.atlas_width, self.atlas_height]
    }

    /// Map a U coordinate in the source sprite's local units to a normalized atlas U.
    pub fn tile_u(&self, local: f32) -> f32 {
        (self.x as f32 + local * self.texels_per_unit_u) / self.atlas_width
    }

    /// Map a V coordinate in the source sprite's local units to a normalized atlas V.
    pub fn tile_v(&self, local: f32) -> f32 {
        (self.y as f32 + local * self.texels_per_unit_v) / self.atlas_height
    }
}

/// Atlas extent along one axis: `origin / min`, or `size / span` when the
/// sprite sits on the atlas edge and `min` is zero.
fn atlas_extent(origin: u32, min: f32, size: u32, span: f32) -> f32 {
    let extent = if min > 0.0 {
        origin as f32 / min
    } else if span > 0.0 {
        size as f32 / span
    } else {
        size as f32
    };
    extent.round().max(1.0)
}

impl Sprite for CroppedSprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn x(&self) -> u32 {
        self.x
    }

    fn y(&self) -> u32 {
        self.y
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn u0(&self) -> f32 {
        self.tile_u(0.0)
    }

    fn u1(&self) -> f32 {
        self.tile_u(CROPPED_UNITS)
    }

    fn v0(&self) -> f32 {
        self.tile_v(0.0)
    }

    fn v1(&self) -> f32 {
        self.tile_v(CROPPED_UNITS)
    }

    fn u(&self, local: f32) -> f32 {
        self.tile_u(local * TILE_UNITS_PER_SPRITE_UNIT)
    }

    fn v(&self, local: f32) -> f32 {
        self.tile_v(local * TILE_UNITS_PER_SPRITE_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use glassmesh_core::AtlasSprite;

    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn crops_to_an_eighth() {
        let source = AtlasSprite::from_pixels("glass", [64, 32], [128, 64], [512, 256]);
        let cropped = CroppedSprite::new(&source);
        assert_eq!(cropped.width(), 16);
        assert_eq!(cropped.height(), 8);
        assert_eq!((cropped.x(), cropped.y()), (64, 32));
        assert_eq!(cropped.atlas_size(), [512.0, 256.0]);
        assert_eq!(cropped.name(), "glass");
    }

    #[test]
    fn region_is_top_left_tile_of_source() {
        let source = AtlasSprite::from_pixels("glass", [16, 48], [16, 16], [64, 64]);
        let cropped = CroppedSprite::new(&source);
        assert!((cropped.u0() - source.u0).abs() < EPS);
        assert!((cropped.v0() - source.v0).abs() < EPS);
        let tile_u = (source.u1 - source.u0) / CROP_DIVISOR as f32;
        let tile_v = (source.v1 - source.v0) / CROP_DIVISOR as f32;
        assert!((cropped.u1() - (source.u0 + tile_u)).abs() < EPS);
        assert!((cropped.v1() - (source.v0 + tile_v)).abs() < EPS);
    }

    #[test]
    fn tile_units_keep_source_scale() {
        let source = AtlasSprite::from_pixels("glass", [32, 16], [16, 16], [64, 64]);
        let cropped = CroppedSprite::new(&source);
        for local in [0.0, 0.5, 1.0, 2.0] {
            assert!((cropped.tile_u(local) - source.u(local)).abs() < EPS);
            assert!((cropped.tile_v(local) - source.v(local)).abs() < EPS);
        }
    }

    #[test]
    fn sprite_units_span_the_cropped_region() {
        let source = AtlasSprite::from_pixels("glass", [16, 16], [16, 16], [64, 64]);
        let cropped = CroppedSprite::new(&source);
        assert_eq!(cropped.u(0.0), cropped.u0());
        assert_eq!(cropped.v(0.0), cropped.v0());
        assert!((cropped.u(SPRITE_UNITS) - cropped.u1()).abs() < EPS);
        assert!((cropped.v(SPRITE_UNITS) - cropped.v1()).abs() < EPS);
        assert!((cropped.u(8.0) - (cropped.u0() + cropped.u1()) / 2.0).abs() < EPS);
        assert!(cropped.u(SPRITE_UNITS) < source.u1);
    }

    #[test]
    fn sprite_on_atlas_edge_uses_span() {
        let source = AtlasSprite::from_pixels("glass", [0, 0], [16, 16], [16, 16]);
        let cropped = CroppedSprite::new(&source);
        assert_eq!(cropped.atlas_size(), [16.0, 16.0]);
        assert!((cropped.u1() - 0.125).abs() < EPS);
        assert!((cropped.tile_u(1.0) - 0.0625).abs() < EPS);
        assert!((cropped.u(8.0) - 0.0625).abs() < EPS);
    }
}
