//! Sprite, quad and model fixtures shared by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::{Mat4, Vec3};
use glassmesh_core::{
    AtlasSprite, BakedModel, BakedQuad, BlockState, BlockVertex, CameraTransform, Direction,
    ModelData, ModelError, QuadList, Sprite, SPRITE_UNITS,
};

/// Square sprite of `size` pixels at pixel `origin` inside an atlas of `atlas` pixels.
pub fn sprite_at(name: &str, origin: [u32; 2], size: u32, atlas: [u32; 2]) -> Arc<AtlasSprite> {
    Arc::new(AtlasSprite::from_pixels(name, origin, [size, size], atlas))
}

/// Unit quad on `direction` whose vertices sample the given local sprite coordinates.
pub fn quad_with_uvs(
    sprite: &Arc<AtlasSprite>,
    direction: Direction,
    local_uvs: [[f32; 2]; 4],
) -> BakedQuad {
    let normal = direction.normal();
    let corners = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
    let vertices = std::array::from_fn(|i| {
        let [a, b] = corners[i];
        let [lu, lv] = local_uvs[i];
        BlockVertex::new([a, b, 0.0], [sprite.u(lu), sprite.v(lv)], normal)
    });
    BakedQuad::from_block_vertices(&vertices, None, direction, Arc::clone(sprite), true)
}

/// Quad on `direction` covering the whole sprite.
pub fn full_face_quad(sprite: &Arc<AtlasSprite>, direction: Direction) -> BakedQuad {
    quad_with_uvs(
        sprite,
        direction,
        [
            [0.0, 0.0],
            [0.0, SPRITE_UNITS],
            [SPRITE_UNITS, SPRITE_UNITS],
            [SPRITE_UNITS, 0.0],
        ],
    )
}

/// Source model that counts quad queries.
pub struct CountingModel {
    sprite: Arc<AtlasSprite>,
    faces: [QuadList; Direction::COUNT],
    unculled: QuadList,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl CountingModel {
    /// Model with no quads at all.
    pub fn new(sprite: Arc<AtlasSprite>) -> Self {
        Self {
            sprite,
            faces: std::array::from_fn(|_| QuadList::from(Vec::new())),
            unculled: QuadList::from(Vec::new()),
            calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Model with one full-sprite quad per face.
    pub fn cube(sprite: Arc<AtlasSprite>) -> Self {
        let mut model = Self::new(Arc::clone(&sprite));
        for dir in Direction::ALL {
            model.faces[dir.index()] = QuadList::from(vec![full_face_quad(&sprite, dir)]);
        }
        model
    }

    /// Replace the quads returned for `direction`.
    pub fn with_face(mut self, direction: Direction, quads: Vec<BakedQuad>) -> Self {
        self.faces[direction.index()] = quads.into();
        self
    }

    /// Replace the quads returned for the directionless query.
    pub fn with_unculled(mut self, quads: Vec<BakedQuad>) -> Self {
        self.unculled = quads.into();
        self
    }

    /// Sleep for `latency` inside every query, widening race windows.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of quad queries served.
    pub fn calls(&self) -> &AtomicUsize {
        &self.calls
    }

    /// Quads served for `side`, without counting a call.
    pub fn quads_for(&self, side: Option<Direction>) -> QuadList {
        match side {
            Some(dir) => self.faces[dir.index()].clone(),
            None => self.unculled.clone(),
        }
    }

    /// The model's sprite.
    pub fn sprite(&self) -> &AtlasSprite {
        &self.sprite
    }
}

impl BakedModel for CountingModel {
    fn quads(
        &self,
        _state: Option<&BlockState>,
        side: Option<Direction>,
        _seed: u64,
        _data: &ModelData,
    ) -> Result<QuadList, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        Ok(self.quads_for(side))
    }

    fn particle_sprite(&self) -> &dyn Sprite {
        self.sprite.as_ref()
    }

    fn handle_perspective(
        self: Arc<Self>,
        transform: CameraTransform,
    ) -> (Arc<dyn BakedModel>, Mat4) {
        let matrix = match transform {
            CameraTransform::None => Mat4::IDENTITY,
            _ => Mat4::from_scale(Vec3::splat(0.5)),
        };
        (self, matrix)
    }
}
