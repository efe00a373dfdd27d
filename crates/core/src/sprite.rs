//! Texture atlas sprites.
//!
//! A sprite is a rectangular region of the block atlas. Local sprite
//! coordinates use the 16-unit block-face convention: local `0` is the
//! sprite's left/top edge and local [`SPRITE_UNITS`] its right/bottom edge.

use serde::{Deserialize, Serialize};

/// Local coordinate span covering a full sprite.
pub const SPRITE_UNITS: f32 = 16.0;

/// Coordinate queries shared by every sprite-like atlas region.
pub trait Sprite: Send + Sync {
    /// Atlas entry name (e.g. `"blocks/glass"`).
    fn name(&self) -> &str;
    /// X origin in atlas pixels.
    fn x(&self) -> u32;
    /// Y origin in atlas pixels.
    fn y(&self) -> u32;
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Normalized left edge.
    fn u0(&self) -> f32;
    /// Normalized right edge.
    fn u1(&self) -> f32;
    /// Normalized top edge.
    fn v0(&self) -> f32;
    /// Normalized bottom edge.
    fn v1(&self) -> f32;
    /// Map a local U coordinate to a normalized atlas U.
    fn u(&self, local: f32) -> f32;
    /// Map a local V coordinate to a normalized atlas V.
    fn v(&self, local: f32) -> f32;

    /// Whether a normalized atlas UV falls inside this sprite's region.
    fn contains_uv(&self, u: f32, v: f32, epsilon: f32) -> bool {
        u >= self.u0() - epsilon
            && u <= self.u1() + epsilon
            && v >= self.v0() - epsilon
            && v <= self.v1() + epsilon
    }
}

/// A sprite entry stored in the block atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasSprite {
    /// Logical identifier.
    pub name: String,
    /// X offset in pixels within the atlas (top-left origin).
    pub x: u32,
    /// Y offset in pixels within the atlas (top-left origin).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Normalized left U coordinate.
    pub u0: f32,
    /// Normalized top V coordinate.
    pub v0: f32,
    /// Normalized right U coordinate.
    pub u1: f32,
    /// Normalized bottom V coordinate.
    pub v1: f32,
}

impl AtlasSprite {
    /// Build a sprite from its pixel rectangle inside an atlas of the given size.
    pub fn from_pixels(
        name: impl Into<String>,
        [x, y]: [u32; 2],
        [width, height]: [u32; 2],
        [atlas_width, atlas_height]: [u32; 2],
    ) -> Self {
        let aw = atlas_width.max(1) as f32;
        let ah = atlas_height.max(1) as f32;
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            u0: x as f32 / aw,
            v0: y as f32 / ah,
            u1: (x + width) as f32 / aw,
            v1: (y + height) as f32 / ah,
        }
    }
}

impl Sprite for AtlasSprite {
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
        self.u0
    }

    fn u1(&self) -> f32 {
        self.u1
    }

    fn v0(&self) -> f32 {
        self.v0
    }

    fn v1(&self) -> f32 {
        self.v1
    }

    fn u(&self, local: f32) -> f32 {
        self.u0 + (self.u1 - self.u0) * local / SPRITE_UNITS
    }

    fn v(&self, local: f32) -> f32 {
        self.v0 + (self.v1 - self.v0) * local / SPRITE_UNITS
    }
}
