use std::{collections::HashSet, fs, path::Path, sync::Arc};

use glassmesh_core::AtlasSprite;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance when checking that sprite UVs agree with their pixel rectangle.
const UV_EPSILON: f32 = 1e-4;

/// Errors that can occur while loading or validating atlas metadata.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Wrap IO failures when reading metadata files.
    #[error("failed to read atlas metadata: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap JSON parsing issues.
    #[error("failed to parse atlas metadata: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation errors describing why metadata is inconsistent.
    #[error("invalid atlas metadata: {0}")]
    Invalid(String),
}

/// Grid layout of the block atlas and the sprites packed into it.
///
/// Every sprite occupies one `tile_size` cell surrounded by `padding` pixels,
/// so the atlas is exactly `columns x rows` padded cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureAtlasMetadata {
    /// Cell size in pixels.
    pub tile_size: u32,
    /// Padding on each side of a cell, in pixels.
    pub padding: u32,
    /// Cells per row.
    pub columns: u32,
    /// Cells per column.
    pub rows: u32,
    /// Atlas width in pixels.
    pub atlas_width: u32,
    /// Atlas height in pixels.
    pub atlas_height: u32,
    /// Packed sprites.
    pub entries: Vec<AtlasSprite>,
}

impl TextureAtlasMetadata {
    /// Parse and validate metadata from JSON.
    pub fn parse_str(input: &str) -> Result<Self, AtlasError> {
        let metadata: TextureAtlasMetadata = serde_json::from_str(input)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Read, parse and validate a metadata file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        Self::parse_str(&fs::read_to_string(path)?)
    }

    /// Lay `names` out on a padded square-ish grid of `tile_size` cells.
    ///
    /// Used when no authored atlas is available.
    pub fn debug_grid<S: AsRef<str>>(names: &[S], tile_size: u32, padding: u32) -> Self {
        let tile_size = tile_size.max(1);
        let count = names.len().max(1) as u32;
        let columns = (count as f32).sqrt().ceil() as u32;
        let rows = count.div_ceil(columns);
        let cell = tile_size + padding * 2;
        let size = [columns * cell, rows * cell];
        let entries = (0u32..)
            .zip(names)
            .map(|(index, name)| {
                let origin = [
                    (index % columns) * cell + padding,
                    (index / columns) * cell + padding,
                ];
                AtlasSprite::from_pixels(name.as_ref(), origin, [tile_size, tile_size], size)
            })
            .collect();
        Self {
            tile_size,
            padding,
            columns,
            rows,
            atlas_width: size[0],
            atlas_height: size[1],
            entries,
        }
    }

    /// Check grid geometry, then every sprite against it.
    pub fn validate(&self) -> Result<(), AtlasError> {
        self.validate_grid()?;
        let mut names = HashSet::new();
        for sprite in &self.entries {
            if !names.insert(sprite.name.as_str()) {
                return Err(AtlasError::Invalid(format!(
                    "sprite '{}' packed twice",
                    sprite.name
                )));
            }
            self.validate_sprite(sprite)?;
        }
        Ok(())
    }

    fn validate_grid(&self) -> Result<(), AtlasError> {
        if self.tile_size == 0 || self.columns == 0 || self.rows == 0 {
            return Err(AtlasError::Invalid(format!(
                "empty grid: tile_size={} columns={} rows={}",
                self.tile_size, self.columns, self.rows
            )));
        }
        let cell = self.tile_size + self.padding * 2;
        let expected = [self.columns * cell, self.rows * cell];
        if [self.atlas_width, self.atlas_height] != expected {
            return Err(AtlasError::Invalid(format!(
                "atlas is {}x{} but a {}x{} grid of {}px cells needs {}x{}",
                self.atlas_width,
                self.atlas_height,
                self.columns,
                self.rows,
                cell,
                expected[0],
                expected[1]
            )));
        }
        Ok(())
    }

    fn validate_sprite(&self, sprite: &AtlasSprite) -> Result<(), AtlasError> {
        if [sprite.width, sprite.height] != [self.tile_size; 2] {
            return Err(AtlasError::Invalid(format!(
                "sprite '{}' is {}x{}, cells are {}px",
                sprite.name, sprite.width, sprite.height, self.tile_size
            )));
        }
        let right = sprite.x.checked_add(sprite.width);
        let bottom = sprite.y.checked_add(sprite.height);
        if right.map_or(true, |r| r > self.atlas_width)
            || bottom.map_or(true, |b| b > self.atlas_height)
        {
            return Err(AtlasError::Invalid(format!(
                "sprite '{}' at ({}, {}) leaves the atlas",
                sprite.name, sprite.x, sprite.y
            )));
        }
        let expected = AtlasSprite::from_pixels(
            sprite.name.as_str(),
            [sprite.x, sprite.y],
            [sprite.width, sprite.height],
            [self.atlas_width, self.atlas_height],
        );
        let uvs = |s: &AtlasSprite| [s.u0, s.v0, s.u1, s.v1];
        let drift = uvs(sprite)
            .into_iter()
            .zip(uvs(&expected))
            .any(|(found, want)| (found - want).abs() > UV_EPSILON);
        if drift {
            return Err(AtlasError::Invalid(format!(
                "sprite '{}' UVs {:?} disagree with its pixel rect {:?}",
                sprite.name,
                uvs(sprite),
                uvs(&expected)
            )));
        }
        Ok(())
    }

    /// Sprite packed under `name`.
    pub fn sprite(&self, name: &str) -> Option<Arc<AtlasSprite>> {
        self.entries
            .iter()
            .find(|sprite| sprite.name == name)
            .cloned()
            .map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassmesh_core::Sprite;

    fn two_cell_atlas() -> TextureAtlasMetadata {
        TextureAtlasMetadata::debug_grid(&["clear_glass", "red_clear_glass"], 16, 2)
    }

    #[test]
    fn parses_authored_metadata() {
        let json = r#"{
            "tile_size": 16,
            "padding": 2,
            "columns": 2,
            "rows": 1,
            "atlas_width": 40,
            "atlas_height": 20,
            "entries": [
                {"name":"clear_glass","x":2,"y":2,"width":16,"height":16,"u0":0.05,"v0":0.1,"u1":0.45,"v1":0.9},
                {"name":"red_clear_glass","x":22,"y":2,"width":16,"height":16,"u0":0.55,"v0":0.1,"u1":0.95,"v1":0.9}
            ]
        }"#;
        let atlas = TextureAtlasMetadata::parse_str(json).unwrap();
        let sprite = atlas.sprite("red_clear_glass").expect("sprite packed");
        assert_eq!(sprite.x(), 22);
        assert_eq!(sprite.u1(), 0.95);
        assert!(atlas.sprite("blue_clear_glass").is_none());
    }

    #[test]
    fn rejects_sprite_outside_atlas() {
        let mut atlas = two_cell_atlas();
        atlas.entries[1].x = 30;
        let err = atlas.validate().unwrap_err();
        assert!(matches!(err, AtlasError::Invalid(msg) if msg.contains("leaves the atlas")));
    }

    #[test]
    fn rejects_uvs_that_drift_from_pixels() {
        let mut atlas = two_cell_atlas();
        atlas.entries[0].u1 = 1.0;
        let err = atlas.validate().unwrap_err();
        assert!(matches!(err, AtlasError::Invalid(msg) if msg.contains("disagree")));
    }

    #[test]
    fn rejects_duplicate_and_grid_mismatch() {
        let mut atlas = two_cell_atlas();
        atlas.entries[1] = atlas.entries[0].clone();
        assert!(atlas.validate().is_err());

        let mut atlas = two_cell_atlas();
        atlas.atlas_width += 1;
        assert!(atlas.validate().is_err());
    }

    #[test]
    fn debug_grid_is_square_ish_and_valid() {
        let names = ["clear_glass", "clear_glass_pane", "tinted_glass"];
        let atlas = TextureAtlasMetadata::debug_grid(&names, 16, 1);
        atlas.validate().expect("generated grid is consistent");
        assert_eq!((atlas.columns, atlas.rows), (2, 2));
        assert_eq!(atlas.atlas_width, 36);
        let sprite = atlas.sprite("tinted_glass").unwrap();
        assert_eq!((sprite.x, sprite.y), (1, 19));
    }
}
