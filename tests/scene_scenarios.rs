use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{Quaternion, Vector3};

use sanctum::animation::{AnimationClip, Channel, ChannelOutput, Interpolation, StartMode};
use sanctum::assets::{AssetBuilder, AssetCache, AssetData, AssetStatus, Dispatch, MemoryLoader};
use sanctum::gfx::picking::Ray;
use sanctum::params::{keys, CompiledDefaults};
use sanctum::placement::{PlacementCatalog, Transform, GLOW_GREEN, GLOW_LAYER};
use sanctum::scene::{SceneAssembly, Stage};

const DIR: &str = "models";
const DT: f32 = 0.1;

fn path(name: &str) -> String {
    format!("{}/{}", DIR, name)
}

fn static_asset(name: &str) -> AssetData {
    let mut builder = AssetBuilder::new(&path(name));
    let root = builder.group(None, "root");
    builder.mesh_node(Some(root), "body");
    builder.mesh_node(Some(root), "antlers");
    builder.build()
}

fn seraphim(with_clip: bool) -> AssetData {
    let mut builder = AssetBuilder::new(&path("seraphim.glb"));
    let wing = builder.mesh_node(None, "wing");
    if with_clip {
        builder.clip(AnimationClip::new(
            "flap",
            vec![
                Channel {
                    node: wing,
                    times: vec![0.0, 1.0],
                    output: ChannelOutput::Translation(vec![
                        Vector3::new(0.0, 0.0, 0.0),
                        Vector3::new(0.0, 1.0, 0.0),
                    ]),
                    interpolation: Interpolation::Linear,
                },
                Channel {
                    node: wing,
                    times: vec![0.0, 1.0],
                    output: ChannelOutput::Rotation(vec![
                        Quaternion::new(1.0, 0.0, 0.0, 0.0),
                        Quaternion::new(1.0, 0.0, 0.0, 0.0),
                    ]),
                    interpolation: Interpolation::Step,
                },
            ],
        ));
    }
    builder.build()
}

fn garden_loader(with_clip: bool) -> Arc<MemoryLoader> {
    Arc::new(
        MemoryLoader::new()
            .with(static_asset("stylized_spawn_point.glb"))
            .with(static_asset("statue.glb"))
            .with(static_asset("stag_and_friends_original.glb"))
            .with(seraphim(with_clip)),
    )
}

fn stage_with(loader: Arc<MemoryLoader>, start_mode: StartMode) -> Stage {
    let cache = AssetCache::new(loader, Dispatch::Inline);
    Stage::new(cache, SceneAssembly::standard(DIR, start_mode))
}

/// Runs `count` frames on compiled defaults
fn run(stage: &mut Stage, count: usize) {
    for _ in 0..count {
        stage.frame(DT, &CompiledDefaults);
    }
}

#[test]
fn statue_is_placed_without_override() {
    let mut stage = stage_with(garden_loader(true), StartMode::Auto);
    run(&mut stage, 2);

    let tree = stage.frame(DT, &CompiledDefaults);
    let statue = tree.model("statue.glb").unwrap();
    let instance = statue.instance.unwrap();

    assert_eq!(statue.transform, Transform::at([0.0, 6.0, 0.0], 1.0));
    assert_eq!(statue.transform.rotation, [0.0, 0.0, 0.0]);
    assert!(instance.placement.material_override.is_none());
    assert!(instance.meshes.iter().all(|m| !m.layers.contains(GLOW_LAYER)));
}

#[test]
fn stag_glows_on_its_own_material_copies() {
    let mut stage = stage_with(garden_loader(true), StartMode::Auto);
    run(&mut stage, 2);

    let tree = stage.frame(DT, &CompiledDefaults);
    let stag = tree.model("stag_and_friends_original").unwrap();
    let instance = stag.instance.unwrap();

    assert_eq!(stag.transform.position, [10.0, 8.0, 30.0]);
    assert_eq!(stag.transform.scale, [5.0, 5.0, 5.0]);
    assert_eq!(instance.meshes.len(), 2);
    for mesh in &instance.meshes {
        assert!(mesh.layers.contains(GLOW_LAYER));
        for material in &mesh.materials {
            assert_eq!(material.emissive, GLOW_GREEN);
            assert_eq!(material.emissive_intensity, 2.0);
        }
    }

    // The shared asset keeps its authored materials
    let shared = instance.handle();
    assert!(shared.materials.iter().all(|m| m.emissive == [0.0, 0.0, 0.0]));
}

#[test]
fn unknown_model_gets_identity_placement() {
    let foo = path("foo.glb");
    let loader = Arc::new(
        MemoryLoader::new()
            .with(static_asset("foo.glb"))
            .with(seraphim(true)),
    );
    let assembly = SceneAssembly::new(
        &[foo],
        path("seraphim.glb"),
        PlacementCatalog::standard(),
        StartMode::Auto,
    );
    let mut stage = Stage::new(AssetCache::new(loader, Dispatch::Inline), assembly);
    run(&mut stage, 2);

    let tree = stage.frame(DT, &CompiledDefaults);
    let model = tree.model("foo.glb").unwrap();

    assert_eq!(model.transform, Transform::IDENTITY);
    assert!(model.instance.unwrap().placement.material_override.is_none());
}

#[test]
fn scale_change_applies_next_frame_without_restart() {
    let mut stage = stage_with(garden_loader(true), StartMode::Auto);
    run(&mut stage, 3);

    let before = stage.assembly().animated().clip_time().unwrap();
    assert_eq!(stage.assembly().animated().transform().scale, [8.0, 8.0, 8.0]);

    let params = HashMap::from([(keys::SERAPHIM_SCALE, 20.0f32)]);
    {
        let tree = stage.frame(DT, &params);
        let seraphim = tree.animated_model().unwrap();
        assert_eq!(seraphim.transform.scale, [20.0, 20.0, 20.0]);
        assert_eq!(
            seraphim.instance.unwrap().placement.transform.scale,
            [20.0, 20.0, 20.0]
        );
    }

    let animated = stage.assembly().animated();
    assert_eq!(animated.start_count(), 1);
    assert!(animated.is_playing());
    assert!((animated.clip_time().unwrap() - (before + DT)).abs() < 1e-5);
}

#[test]
fn repeated_frames_load_each_asset_once() {
    let loader = garden_loader(true);
    let mut stage = stage_with(loader.clone(), StartMode::Auto);
    run(&mut stage, 10);

    assert_eq!(loader.load_count(), 4);
    assert_eq!(stage.assembly().animated().start_count(), 1);
    assert_eq!(stage.cache().pending_count(), 0);
}

#[test]
fn unresolved_models_render_nothing() {
    let mut stage = stage_with(garden_loader(true), StartMode::Auto);

    let tree = stage.frame(DT, &CompiledDefaults);
    assert_eq!(tree.models().count(), 4);
    assert!(tree.models().all(|m| m.is_empty()));
}

#[test]
fn model_without_clips_never_plays() {
    let mut stage = stage_with(garden_loader(false), StartMode::Auto);
    run(&mut stage, 5);

    let animated = stage.assembly().animated();
    assert!(animated.instance().is_some());
    assert!(!animated.is_playing());
    assert_eq!(animated.start_count(), 0);
    assert!(animated.clip_time().is_none());
}

#[test]
fn trigger_before_load_starts_playback_on_arrival() {
    let mut stage = stage_with(garden_loader(true), StartMode::OnTrigger);

    assert!(stage.assembly_mut().animated_mut().trigger());
    assert!(!stage.assembly_mut().animated_mut().trigger());
    run(&mut stage, 2);

    let animated = stage.assembly().animated();
    assert!(animated.is_triggered());
    assert!(animated.is_playing());
    assert_eq!(animated.start_count(), 1);
}

#[test]
fn manual_start_waits_for_a_click_on_the_model() {
    let mut stage = stage_with(garden_loader(true), StartMode::OnTrigger);
    run(&mut stage, 3);
    assert!(!stage.assembly().animated().is_playing());

    let miss = Ray::new(Vector3::new(100.0, 100.0, 50.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(!stage.click(&miss));
    assert!(!stage.assembly().animated().is_playing());

    // Seraphim sits at (-0.5, 13, -2) scaled by 8
    let hit = Ray::new(Vector3::new(-0.5, 13.0, 50.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(stage.click(&hit));
    assert!(stage.assembly().animated().is_playing());

    // The latch is single-shot
    assert!(!stage.click(&hit));
    assert_eq!(stage.assembly().animated().start_count(), 1);
}

#[test]
fn failed_load_renders_nothing_and_is_not_retried() {
    let loader = Arc::new(
        MemoryLoader::new()
            .with(static_asset("stylized_spawn_point.glb"))
            .with(static_asset("stag_and_friends_original.glb"))
            .with(seraphim(true)),
    );
    let mut stage = stage_with(loader.clone(), StartMode::Auto);
    run(&mut stage, 5);

    assert_eq!(stage.cache().status(&path("statue.glb")), AssetStatus::Failed);
    assert_eq!(loader.load_count(), 4);

    let tree = stage.frame(DT, &CompiledDefaults);
    assert!(tree.model("statue.glb").unwrap().is_empty());
    assert!(!tree.model("stylized_spawn_point").unwrap().is_empty());
    assert!(!tree.animated_model().unwrap().is_empty());
}

#[test]
fn lighting_and_post_follow_parameters() {
    let mut stage = stage_with(garden_loader(true), StartMode::Auto);
    let params = HashMap::from([
        (keys::AMBIENT, 1.5f32),
        (keys::DIRECTIONAL, 3.0),
        (keys::FOCUS_DISTANCE, 0.1),
    ]);

    let tree = stage.frame(DT, &params);
    assert_eq!(tree.ambient().unwrap().intensity, 1.5);
    assert_eq!(tree.directional().unwrap().intensity, 3.0);
    assert_eq!(tree.post().unwrap().depth_of_field.focus_distance, 0.1);
    assert_eq!(tree.post().unwrap().depth_of_field.bokeh_scale, 2.0);
}
