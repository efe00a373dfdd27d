use glassmesh_assets::{glass_types_from_str, TextureAtlasMetadata};
use glassmesh_core::{
    BakedModel, BakedQuad, CameraTransform, ConnectivityData, Direction, Directions, ModelData,
    Sprite, VertexFormatError,
};
use glassmesh_render::{
    block_display_transform, remap_quad_to_tile, ConnectedModel, CroppedSprite, CubeModel,
    GlassVariant, ModelOverrides, RenderType, TINTED_GLASS,
};
use glassmesh_testkit::{sprite_at, CountingModel};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

const PACK: &str = r#"
[
  { "name": "clear_glass", "has_panes": true },
  { "name": "tinted_borderless_glass", "tinted": true }
]
"#;

fn baked_pipeline() -> (ModelOverrides, TextureAtlasMetadata, glassmesh_render::BakedModels) {
    let types = glass_types_from_str(PACK).expect("valid pack");
    let mut overrides = ModelOverrides::new();
    overrides.register_connected_glass(&types);

    let names: BTreeSet<String> = overrides
        .variants()
        .map(|(variant, _)| variant.sprite_name())
        .collect();
    let names: Vec<String> = names.into_iter().collect();
    let atlas = TextureAtlasMetadata::debug_grid(&names, 16, 1);
    atlas.validate().expect("generated atlas is consistent");

    let models: HashMap<GlassVariant, Arc<dyn BakedModel>> = overrides
        .variants()
        .map(|(variant, _)| {
            let sprite = atlas.sprite(&variant.sprite_name()).expect("sprite present");
            let model: Arc<dyn BakedModel> = Arc::new(CubeModel::new(sprite));
            (variant.clone(), model)
        })
        .collect();
    let baked = overrides.bake(models);
    (overrides, atlas, baked)
}

#[test]
fn registration_decorates_every_glass_variant_once() {
    let (overrides, _, baked) = baked_pipeline();
    // clear_glass: block + pane, 16 colours each; tinted_borderless: block + 16 colours.
    assert_eq!(overrides.override_count(), 34 + 17);
    assert_eq!(baked.connected.len(), overrides.override_count());
    assert!(baked.rejected.is_empty());

    let tinted = GlassVariant::block(TINTED_GLASS);
    assert!(baked.passthrough.contains_key(&tinted));
    assert_eq!(overrides.render_type(&tinted), Some(RenderType::Translucent));
    assert_eq!(
        overrides.render_type(&GlassVariant::pane("clear_glass")),
        Some(RenderType::CutoutMipped)
    );
    assert_eq!(
        overrides.render_type(&GlassVariant::block("tinted_borderless_glass")),
        Some(RenderType::Translucent)
    );

    // Baking queried every side once with empty data.
    let model = &baked.connected[&GlassVariant::block("clear_glass")];
    let stats = model.cache_stats();
    assert_eq!(stats.entries, 7);
    assert_eq!(stats.computations, 7);
}

#[test]
fn decorated_quads_sample_the_cropped_tile() {
    let (_, atlas, baked) = baked_pipeline();
    let variant = GlassVariant::block("clear_glass");
    let model = &baked.connected[&variant];
    let sprite = atlas.sprite(&variant.sprite_name()).unwrap();
    let cropped = CroppedSprite::new(sprite.as_ref());

    let data = ModelData::empty()
        .with(ConnectivityData::from_faces(Directions::UP | Directions::NORTH));
    for dir in Direction::ALL {
        let quads = model.quads(None, Some(dir), 0, &data).unwrap();
        assert_eq!(quads.len(), 1);
        for [u, v] in quads[0].uvs().unwrap() {
            assert!(cropped.contains_uv(u, v, 1e-6), "{dir:?}: ({u}, {v})");
        }
    }

    let particle = model.particle_sprite();
    assert_eq!(particle.width(), 2);
    assert_eq!(particle.height(), 2);
    assert_eq!(particle.u0(), cropped.u0());
}

#[test]
fn perspective_keeps_the_decorator() {
    let (_, _, baked) = baked_pipeline();
    let decorated = Arc::clone(&baked.connected[&GlassVariant::pane("clear_glass")]);
    let (model, matrix) = Arc::clone(&decorated).handle_perspective(CameraTransform::Gui);
    assert_eq!(
        Arc::as_ptr(&model) as *const (),
        Arc::as_ptr(&decorated) as *const ()
    );
    assert_eq!(matrix, block_display_transform(CameraTransform::Gui));
}

#[test]
fn concurrent_first_requests_compute_once_per_key() {
    let source = Arc::new(
        CountingModel::cube(sprite_at("glass", [32, 0], 16, [64, 64]))
            .with_latency(Duration::from_millis(5)),
    );
    let model = ConnectedModel::new(source.clone());
    let payloads: Vec<ModelData> = (0..3u64)
        .map(|bits| ModelData::empty().with(ConnectivityData::new(bits)))
        .collect();
    let threads = 8;
    let barrier = Barrier::new(threads);

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                barrier.wait();
                for data in &payloads {
                    for dir in Direction::ALL {
                        model.quads(None, Some(dir), 0, data).unwrap();
                    }
                }
            });
        }
    });

    let keys = payloads.len() * Direction::COUNT;
    assert_eq!(source.calls().load(Ordering::SeqCst), keys);
    let stats = model.cache_stats();
    assert_eq!(stats.computations, keys as u64);
    assert_eq!(stats.entries, keys);
    assert_eq!(stats.hits + stats.misses, (threads * keys) as u64);
}

#[test]
fn a_slow_key_does_not_block_other_keys() {
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered = Mutex::new(entered_tx);
    let release = Mutex::new(release_rx);
    let blocking = ModelData::empty().with(ConnectivityData::new(1));
    let blocked_signature = ConnectivityData::new(1).signature();

    let remapper = move |quad: &BakedQuad,
                         connectivity: Option<&ConnectivityData>|
          -> Result<Option<BakedQuad>, VertexFormatError> {
        let slow = quad.direction() == Direction::Up
            && connectivity.map(ConnectivityData::signature) == Some(blocked_signature);
        if slow {
            let _ = entered.lock().unwrap().send(());
            let _ = release.lock().unwrap().recv();
        }
        remap_quad_to_tile(quad, [0, 0]).map(Some)
    };
    let source = Arc::new(CountingModel::cube(sprite_at("glass", [0, 0], 16, [64, 64])));
    let model = ConnectedModel::with_remapper(source, remapper);

    thread::scope(|scope| {
        let slow = scope.spawn(|| model.quads(None, Some(Direction::Up), 0, &blocking));
        entered_rx.recv().unwrap();

        // Same key is still in flight; every other key completes meanwhile.
        for dir in Direction::ALL.into_iter().filter(|dir| *dir != Direction::Up) {
            model.quads(None, Some(dir), 0, &blocking).unwrap();
        }
        model.quads(None, Some(Direction::Up), 0, &ModelData::empty()).unwrap();
        model.quads(None, None, 0, &blocking).unwrap();
        assert_eq!(model.cache_stats().entries, 7);

        release_tx.send(()).unwrap();
        let quads = slow.join().unwrap().unwrap();
        assert_eq!(quads.len(), 1);
    });
    assert_eq!(model.cache_stats().entries, 8);
}
