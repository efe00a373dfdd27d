//! Plain textured cube used as the wrapped source model.

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};
use glassmesh_core::{
    AtlasSprite, BakedModel, BakedQuad, BlockState, BlockVertex, CameraTransform, Direction,
    ModelData, ModelError, QuadList, Sprite, SPRITE_UNITS,
};

/// Local UVs for the four corners of every face, counter-clockwise from top-left.
const FACE_UV: [[f32; 2]; 4] = [
    [0.0, 0.0],
    [0.0, SPRITE_UNITS],
    [SPRITE_UNITS, SPRITE_UNITS],
    [SPRITE_UNITS, 0.0],
];

/// A full block with one textured quad per face.
///
/// Every quad is culled by its own face, so the directionless query is empty.
pub struct CubeModel {
    sprite: Arc<AtlasSprite>,
    faces: [QuadList; Direction::COUNT],
    unculled: QuadList,
}

impl CubeModel {
    /// Build a cube sampling `sprite` on every face.
    pub fn new(sprite: Arc<AtlasSprite>) -> Self {
        Self::with_tint(sprite, None)
    }

    /// Build a cube whose quads use tint slot `tint_index`.
    pub fn with_tint(sprite: Arc<AtlasSprite>, tint_index: Option<u32>) -> Self {
        let faces = Direction::ALL.map(|dir| {
            let quad = face_quad(&sprite, dir, tint_index);
            QuadList::from(vec![quad])
        });
        Self {
            sprite,
            faces,
            unculled: QuadList::from(Vec::new()),
        }
    }

    /// Sprite shared by all faces.
    pub fn sprite(&self) -> &Arc<AtlasSprite> {
        &self.sprite
    }
}

fn face_quad(sprite: &Arc<AtlasSprite>, dir: Direction, tint_index: Option<u32>) -> BakedQuad {
    let corners = face_corners(dir);
    let normal = dir.normal();
    let vertices = std::array::from_fn(|i| {
        let [lu, lv] = FACE_UV[i];
        BlockVertex::new(corners[i], [sprite.u(lu), sprite.v(lv)], normal)
    });
    BakedQuad::from_block_vertices(&vertices, tint_index, dir, Arc::clone(sprite), true)
}

fn face_corners(dir: Direction) -> [[f32; 3]; 4] {
    match dir {
        Direction::Down => [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
        Direction::Up => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
        Direction::North => [[1.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        Direction::South => [[0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
        Direction::West => [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
        Direction::East => [[1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
    }
}

/// Display transform of a standard block item.
pub fn block_display_transform(transform: CameraTransform) -> Mat4 {
    let (rotation, translation, scale) = match transform {
        CameraTransform::Gui => ([30.0, 225.0, 0.0], [0.0; 3], 0.625),
        CameraTransform::Ground => ([0.0; 3], [0.0, 3.0, 0.0], 0.25),
        CameraTransform::Fixed => ([0.0; 3], [0.0; 3], 0.5),
        CameraTransform::ThirdPersonLeftHand | CameraTransform::ThirdPersonRightHand => {
            ([75.0, 45.0, 0.0], [0.0, 2.5, 0.0], 0.375)
        }
        CameraTransform::FirstPersonRightHand => ([0.0, 45.0, 0.0], [0.0; 3], 0.4),
        CameraTransform::FirstPersonLeftHand => ([0.0, 225.0, 0.0], [0.0; 3], 0.4),
        CameraTransform::Head | CameraTransform::None => return Mat4::IDENTITY,
    };
    let [rx, ry, rz]: [f32; 3] = rotation;
    Mat4::from_scale_rotation_translation(
        Vec3::splat(scale),
        Quat::from_euler(EulerRot::XYZ, rx.to_radians(), ry.to_radians(), rz.to_radians()),
        Vec3::from_array(translation) / SPRITE_UNITS,
    )
}

impl BakedModel for CubeModel {
    fn quads(
        &self,
        _state: Option<&BlockState>,
        side: Option<Direction>,
        _seed: u64,
        _data: &ModelData,
    ) -> Result<QuadList, ModelError> {
        Ok(match side {
            Some(dir) => self.faces[dir.index()].clone(),
            None => self.unculled.clone(),
        })
    }

    fn particle_sprite(&self) -> &dyn Sprite {
        self.sprite.as_ref()
    }

    fn handle_perspective(
        self: Arc<Self>,
        transform: CameraTransform,
    ) -> (Arc<dyn BakedModel>, Mat4) {
        (self, block_display_transform(transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> CubeModel {
        CubeModel::new(Arc::new(AtlasSprite::from_pixels(
            "glass",
            [16, 0],
            [16, 16],
            [64, 64],
        )))
    }

    #[test]
    fn one_quad_per_face() {
        let cube = cube();
        for dir in Direction::ALL {
            let quads = cube.quads(None, Some(dir), 0, &ModelData::empty()).unwrap();
            assert_eq!(quads.len(), 1);
            assert_eq!(quads[0].direction(), dir);
            let uvs = quads[0].uvs().expect("block format");
            for [u, v] in uvs {
                assert!(cube.sprite().contains_uv(u, v, 1e-6));
            }
        }
        assert!(cube
            .quads(None, None, 0, &ModelData::empty())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn gui_transform_scales_down() {
        let matrix = block_display_transform(CameraTransform::Gui);
        let (scale, _, _) = matrix.to_scale_rotation_translation();
        assert!((scale.x - 0.625).abs() < 1e-5);
        assert_eq!(block_display_transform(CameraTransform::None), Mat4::IDENTITY);
    }
}
