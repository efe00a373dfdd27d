//! Installs connected-glass decorators over the host's baked models.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glassmesh_assets::GlassType;
use glassmesh_core::{BakedModel, Direction, ModelData, ModelError};
use tracing::{debug, error, info};

use crate::{enumerate_variants, render_type_for, ConnectedModel, GlassVariant, RenderType, TINTED_GLASS};

/// Builds the decorator installed for a variant.
pub type OverrideFactory = fn(Arc<dyn BakedModel>) -> ConnectedModel;

/// Render types and model overrides registered for glass variants.
#[derive(Default)]
pub struct ModelOverrides {
    render_types: BTreeMap<GlassVariant, RenderType>,
    overrides: BTreeMap<GlassVariant, OverrideFactory>,
}

/// Result of [`ModelOverrides::bake`].
#[derive(Default)]
pub struct BakedModels {
    /// Decorated models, one per overridden variant.
    pub connected: BTreeMap<GlassVariant, Arc<ConnectedModel>>,
    /// Source models without a registered override, unchanged.
    pub passthrough: BTreeMap<GlassVariant, Arc<dyn BakedModel>>,
    /// Variants whose models failed validation and must not be rendered.
    pub rejected: Vec<(GlassVariant, ModelError)>,
}

impl BakedModels {
    /// Model to render `variant` with.
    pub fn get(&self, variant: &GlassVariant) -> Option<Arc<dyn BakedModel>> {
        if let Some(model) = self.connected.get(variant) {
            let model: Arc<dyn BakedModel> = model.clone();
            return Some(model);
        }
        self.passthrough.get(variant).cloned()
    }
}

impl ModelOverrides {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render type of `variant`.
    pub fn register_render_type(&mut self, variant: GlassVariant, render_type: RenderType) {
        self.render_types.insert(variant, render_type);
    }

    /// Replace the baked model of `variant` with `factory(original)`.
    pub fn register_override(&mut self, variant: GlassVariant, factory: OverrideFactory) {
        self.overrides.insert(variant, factory);
    }

    /// Register render types and decorators for every variant of `types`,
    /// plus the translucent standalone tinted glass block.
    pub fn register_connected_glass(&mut self, types: &[GlassType]) {
        for ty in types {
            for variant in enumerate_variants(std::slice::from_ref(ty)) {
                self.register_render_type(variant.clone(), render_type_for(ty, &variant));
                self.register_override(variant, ConnectedModel::new);
            }
        }
        self.register_render_type(GlassVariant::block(TINTED_GLASS), RenderType::Translucent);
        info!(
            glass_types = types.len(),
            overrides = self.overrides.len(),
            "registered connected glass"
        );
    }

    /// Registered render type of `variant`.
    pub fn render_type(&self, variant: &GlassVariant) -> Option<RenderType> {
        self.render_types.get(variant).copied()
    }

    /// Whether a decorator is registered for `variant`.
    pub fn has_override(&self, variant: &GlassVariant) -> bool {
        self.overrides.contains_key(variant)
    }

    /// Number of registered overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Variants with a registered render type, in order.
    pub fn variants(&self) -> impl Iterator<Item = (&GlassVariant, RenderType)> {
        self.render_types.iter().map(|(variant, ty)| (variant, *ty))
    }

    /// Wrap every overridden source model in exactly one decorator.
    ///
    /// Each decorator is validated by querying every side with empty model
    /// data, which also fills the default cache entries. A model whose quads
    /// cannot be remapped is rejected and left out of the result.
    pub fn bake(&self, models: HashMap<GlassVariant, Arc<dyn BakedModel>>) -> BakedModels {
        let mut baked = BakedModels::default();
        for (variant, model) in models {
            let Some(factory) = self.overrides.get(&variant) else {
                baked.passthrough.insert(variant, model);
                continue;
            };
            let decorated = Arc::new(factory(model));
            match prewarm(decorated.as_ref()) {
                Ok(()) => {
                    debug!(%variant, "installed connected model");
                    baked.connected.insert(variant, decorated);
                }
                Err(err) => {
                    error!(%variant, %err, "rejecting model with broken quads");
                    baked.rejected.push((variant, err));
                }
            }
        }
        baked.rejected.sort_by(|a, b| a.0.cmp(&b.0));
        baked
    }
}

/// Query every side of `model` once with empty model data.
pub fn prewarm(model: &dyn BakedModel) -> Result<(), ModelError> {
    let data = ModelData::empty();
    for side in std::iter::once(None).chain(Direction::ALL.into_iter().map(Some)) {
        model.quads(None, side, 0, &data)?;
    }
    Ok(())
}
