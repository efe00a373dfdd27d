//! Headless bake: decorate every glass variant and warm its caches from worker threads.

use anyhow::{anyhow, Context, Result};
use glassmesh_assets::{glass_types_from_file, GlassType, TextureAtlasMetadata};
use glassmesh_core::{
    BakedModel, ConnectivityData, ConnectivitySignature, Direction, ModelData, ModelError,
    QuadDigest,
};
use glassmesh_render::{
    BakedModels, ConnectedModel, CubeModel, GlassVariant, ModelOverrides,
};
use glassmesh_testkit::{BakeMetric, BakeMetricSink, BakeReport};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::config::GlassMeshConfig;

const DEBUG_TILE_SIZE: u32 = 16;
const DEBUG_PADDING: u32 = 1;

/// Outcome of one bake run.
pub struct BakeSummary {
    /// One metric per decorated variant.
    pub metrics: Vec<BakeMetric>,
    /// Variants whose model failed to decorate.
    pub rejected: usize,
    /// Variants with no sprite in the atlas.
    pub skipped: usize,
}

/// Glass families from the configured file, or the built-in list.
pub fn load_glass_types(config: &GlassMeshConfig) -> Result<Vec<GlassType>> {
    match &config.glass_types {
        Some(path) => glass_types_from_file(path)
            .with_context(|| format!("failed to load glass types from {}", path.display())),
        None => Ok(GlassType::builtin()),
    }
}

/// Registration tables for `types`.
pub fn register(types: &[GlassType]) -> ModelOverrides {
    let mut overrides = ModelOverrides::new();
    overrides.register_connected_glass(types);
    overrides
}

fn load_atlas(config: &GlassMeshConfig, overrides: &ModelOverrides) -> Result<TextureAtlasMetadata> {
    if let Some(path) = &config.atlas_metadata {
        return TextureAtlasMetadata::load_file(path)
            .with_context(|| format!("failed to load atlas metadata from {}", path.display()));
    }
    let names: BTreeSet<String> = overrides
        .variants()
        .map(|(variant, _)| variant.sprite_name())
        .collect();
    let names: Vec<String> = names.into_iter().collect();
    info!(
        sprites = names.len(),
        tile_size = DEBUG_TILE_SIZE,
        "no atlas metadata configured, generating debug atlas"
    );
    Ok(TextureAtlasMetadata::debug_grid(
        &names,
        DEBUG_TILE_SIZE,
        DEBUG_PADDING,
    ))
}

/// Run the full bake described by `config`.
pub fn run(config: &GlassMeshConfig) -> Result<BakeSummary> {
    let types = load_glass_types(config)?;
    let overrides = register(&types);
    let atlas = load_atlas(config, &overrides)?;

    let mut models: HashMap<GlassVariant, Arc<dyn BakedModel>> = HashMap::new();
    let mut skipped = 0;
    for (variant, _) in overrides.variants() {
        let Some(sprite) = atlas.sprite(&variant.sprite_name()) else {
            warn!(%variant, sprite = %variant.sprite_name(), "atlas has no sprite for variant");
            skipped += 1;
            continue;
        };
        models.insert(variant.clone(), Arc::new(CubeModel::new(sprite)));
    }

    let baked = overrides.bake(models);
    for (variant, err) in &baked.rejected {
        warn!(%variant, %err, "variant left undecorated");
    }
    debug!(
        passthrough = baked.passthrough.len(),
        "variants without a decorator kept as-is"
    );

    let metrics = warm_all(config, &overrides, &baked)?;
    if let Some(path) = &config.metrics_output {
        let mut sink = BakeMetricSink::create(path)
            .with_context(|| format!("failed to create metrics file {}", path.display()))?;
        sink.write(&BakeReport::now(metrics.clone()))?;
        info!(path = %path.display(), "wrote bake metrics");
    }

    info!(
        decorated = baked.connected.len(),
        rejected = baked.rejected.len(),
        skipped,
        "bake finished"
    );
    Ok(BakeSummary {
        metrics,
        rejected: baked.rejected.len(),
        skipped,
    })
}

fn warm_all(
    config: &GlassMeshConfig,
    overrides: &ModelOverrides,
    baked: &BakedModels,
) -> Result<Vec<BakeMetric>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut metrics = Vec::with_capacity(baked.connected.len());
    for (variant, model) in &baked.connected {
        let payloads: Vec<ModelData> = (0..config.signatures_per_variant)
            .map(|_| ModelData::empty().with(ConnectivityData::new(rng.gen())))
            .collect();
        warm(model, &payloads, config.worker_threads.max(1))
            .with_context(|| format!("failed to warm {variant}"))?;

        let render_type = overrides
            .render_type(variant)
            .ok_or_else(|| anyhow!("no render type registered for {variant}"))?;
        let metric = collect_metric(variant, render_type.as_str(), model);
        info!(
            variant = %metric.variant,
            render_type = %metric.render_type,
            entries = metric.entries,
            computations = metric.computations,
            hits = metric.hits,
            "warmed variant"
        );
        metrics.push(metric);
    }
    Ok(metrics)
}

/// Request every side for every payload from `threads` workers at once.
pub fn warm(model: &ConnectedModel, payloads: &[ModelData], threads: usize) -> Result<()> {
    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(move || -> Result<(), ModelError> {
                    for data in payloads {
                        for side in sides() {
                            model.quads(None, side, 0, data)?;
                        }
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("bake worker panicked"))??;
        }
        Ok(())
    })
}

fn sides() -> impl Iterator<Item = Option<Direction>> {
    std::iter::once(None).chain(Direction::ALL.into_iter().map(Some))
}

fn collect_metric(variant: &GlassVariant, render_type: &str, model: &ConnectedModel) -> BakeMetric {
    let stats = model.cache_stats();
    let default_quads: Vec<_> = sides()
        .filter_map(|side| model.cached_quads(side, ConnectivitySignature::NONE))
        .flat_map(|quads| quads.to_vec())
        .collect();
    BakeMetric {
        variant: variant.block_name(),
        render_type: render_type.to_string(),
        quads: default_quads.len(),
        entries: stats.entries,
        computations: stats.computations,
        hits: stats.hits,
        hash: QuadDigest::of(&default_quads).to_hex(),
    }
}
