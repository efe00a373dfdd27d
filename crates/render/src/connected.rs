//! Decorator that serves cropped-tile geometry for connecting glass.

use std::sync::Arc;

use glam::Mat4;
use glassmesh_core::{
    BakedModel, BakedQuad, BlockState, CameraTransform, ConnectivityData, ConnectivitySignature,
    Direction, ModelData, ModelError, QuadList, Sprite,
};
use tracing::debug;

use crate::{CornerTileRemapper, CroppedSprite, QuadCache, QuadCacheStats, QuadRemapper};

/// Wraps a baked model and remaps its quads into a cropped atlas tile.
///
/// Remapped quads are cached per `(side, connectivity signature)`, so each
/// distinct connectivity pattern is transformed once for the lifetime of the
/// model. The particle sprite is the cropped tile as well, so particles sample
/// the same region as the geometry.
pub struct ConnectedModel<R = CornerTileRemapper> {
    inner: Arc<dyn BakedModel>,
    particle: CroppedSprite,
    cache: QuadCache,
    remapper: R,
}

impl ConnectedModel {
    /// Wrap `inner` with the standard corner-tile remap.
    pub fn new(inner: Arc<dyn BakedModel>) -> Self {
        Self::with_remapper(inner, CornerTileRemapper)
    }
}

impl<R: QuadRemapper> ConnectedModel<R> {
    /// Wrap `inner`, transforming quads with `remapper`.
    pub fn with_remapper(inner: Arc<dyn BakedModel>, remapper: R) -> Self {
        let particle = CroppedSprite::new(inner.particle_sprite());
        Self {
            inner,
            particle,
            cache: QuadCache::new(),
            remapper,
        }
    }

    /// The wrapped model.
    pub fn inner(&self) -> &Arc<dyn BakedModel> {
        &self.inner
    }

    /// Counters of the quad cache.
    pub fn cache_stats(&self) -> QuadCacheStats {
        self.cache.stats()
    }

    /// Cached quads for a key, without computing anything.
    pub fn cached_quads(
        &self,
        side: Option<Direction>,
        signature: ConnectivitySignature,
    ) -> Option<QuadList> {
        self.cache.get(side, signature)
    }

    fn remap_quads(
        &self,
        quads: &[BakedQuad],
        connectivity: Option<&ConnectivityData>,
    ) -> Result<QuadList, ModelError> {
        let mut remapped = Vec::with_capacity(quads.len());
        for quad in quads {
            if let Some(quad) = self.remapper.remap(quad, connectivity)? {
                remapped.push(quad);
            }
        }
        Ok(remapped.into())
    }
}

impl<R: QuadRemapper + 'static> BakedModel for ConnectedModel<R> {
    fn quads(
        &self,
        state: Option<&BlockState>,
        side: Option<Direction>,
        seed: u64,
        data: &ModelData,
    ) -> Result<QuadList, ModelError> {
        let connectivity = data.get::<ConnectivityData>();
        let signature = data.connectivity_signature();

        self.cache.get_or_compute(side, signature, || {
            let source = self.inner.quads(state, side, seed, data)?;
            let remapped = self.remap_quads(&source, connectivity)?;
            debug!(
                side = side.map_or("none", Direction::as_str),
                signature = signature.raw(),
                source = source.len(),
                remapped = remapped.len(),
                "remapped quads"
            );
            Ok(remapped)
        })
    }

    fn particle_sprite(&self) -> &dyn Sprite {
        &self.particle
    }

    fn handle_perspective(
        self: Arc<Self>,
        transform: CameraTransform,
    ) -> (Arc<dyn BakedModel>, Mat4) {
        let (_, matrix) = Arc::clone(&self.inner).handle_perspective(transform);
        (self, matrix)
    }
}
