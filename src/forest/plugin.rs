// src/forest/plugin.rs
//! Forest plugin wiring (glue).
//! - Registry asset/loader
//! - ForestSettings + ForestSeed
//! - Full rebuild on any parameter change: every placed tree is despawned
//!   and the whole forest is sampled and spawned again. No incremental
//!   patching of a live placement session.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::core::{ForestSeed, PlacementSet, Region};
use super::placement::make_strategy;
use super::registry::{
    ForestRegistry, ForestRegistryAssetPlugin, RenderRef, ScatterDef, TreeArchetypeDef,
};

/// Configure where the registry manifest lives and the session bounds.
#[derive(Resource, Clone)]
pub struct ForestSettings {
    pub registry_path: String,
    pub world_seed: u64,
    /// Ground disc radius (meters).
    pub ground_radius: f32,
    /// Kept clear of placements along the ground rim (meters).
    pub edge_margin: f32,
    /// Global multiplier on every archetype's target count.
    pub density: f32,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            registry_path: "forest/archetypes.forest.ron".to_string(),
            world_seed: 1337,
            ground_radius: 250.0,
            edge_margin: 40.0,
            density: 1.0,
        }
    }
}

impl ForestSettings {
    /// Session sampling bounds derived from the ground extent.
    pub fn region(&self) -> Region {
        Region::Disk { radius: self.ground_radius - self.edge_margin }
    }
}

/// Handle to the loaded ForestRegistry asset.
#[derive(Resource, Default)]
pub struct ForestRegistryHandle(pub Handle<ForestRegistry>);

/// Discard every placed tree and build the forest again from scratch.
#[derive(Event, Clone, Copy)]
pub struct RegenerateForest;

/// Marker for every spawned tree entity.
#[derive(Component)]
pub struct ForestTree;

pub struct ForestPlugin;
impl Plugin for ForestPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ForestRegistryAssetPlugin)
            .init_resource::<ForestSettings>()
            .init_resource::<ForestRegistryHandle>()
            .add_event::<RegenerateForest>()
            .add_systems(Startup, (init_seed_from_settings, load_registry))
            .add_systems(Update, (request_rebuild_on_change, kick_initial_build))
            .add_systems(
                Update,
                rebuild_forest
                    .run_if(registry_ready)
                    .after(request_rebuild_on_change)
                    .after(kick_initial_build),
            );
    }
}

/// Startup: insert ForestSeed based on ForestSettings.
fn init_seed_from_settings(mut commands: Commands, settings: Res<ForestSettings>) {
    commands.insert_resource(ForestSeed(settings.world_seed));
}

/// Startup: request loading the registry manifest, store handle.
fn load_registry(
    mut handle_res: ResMut<ForestRegistryHandle>,
    settings: Res<ForestSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() {
        return;
    }
    handle_res.0 = assets.load(settings.registry_path.as_str());
    info!(
        "Forest: loading registry from '{}', world_seed={}",
        settings.registry_path, settings.world_seed
    );
}

fn registry_ready(
    handle: Res<ForestRegistryHandle>,
    regs: Res<Assets<ForestRegistry>>,
) -> bool {
    regs.get(&handle.0).is_some()
}

/// Update: any settings or seed change invalidates every placement.
fn request_rebuild_on_change(
    settings: Res<ForestSettings>,
    seed: Option<Res<ForestSeed>>,
    mut regen: EventWriter<RegenerateForest>,
) {
    let seed_changed = seed.as_ref().is_some_and(|s| s.is_changed() && !s.is_added());
    if (settings.is_changed() && !settings.is_added()) || seed_changed {
        regen.write(RegenerateForest);
    }
}

/// Update: announce the registry and request the first build once it is ready.
fn kick_initial_build(
    handle: Res<ForestRegistryHandle>,
    regs: Res<Assets<ForestRegistry>>,
    mut regen: EventWriter<RegenerateForest>,
    mut kicked: Local<bool>,
) {
    if *kicked {
        return;
    }
    if regs.get(&handle.0).is_some() {
        *kicked = true;
        info!("Forest: registry loaded and ready");
        regen.write(RegenerateForest);
    }
}

/// Handle rebuild requests: despawn every placed tree, then sample and spawn
/// every archetype from scratch.
fn rebuild_forest(
    mut evr: EventReader<RegenerateForest>,
    mut commands: Commands,
    existing: Query<Entity, With<ForestTree>>,
    regs: Res<Assets<ForestRegistry>>,
    handle: Res<ForestRegistryHandle>,
    settings: Res<ForestSettings>,
    seed: Res<ForestSeed>,
    assets: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if evr.is_empty() {
        return;
    }
    evr.clear();

    let Some(reg) = regs.get(&handle.0) else { return };

    let mut dropped = 0;
    for entity in &existing {
        commands.entity(entity).despawn();
        dropped += 1;
    }

    let region = settings.region();
    let mut spawned = 0;

    for (idx, arche) in reg.archetypes.iter().enumerate() {
        let def = arche.scatter.scaled(settings.density);
        let strat = match make_strategy(&def, region, idx as u64) {
            Ok(s) => s,
            Err(err) => {
                warn!("Forest: skipping archetype '{}': {err}", arche.name);
                continue;
            }
        };

        let ScatterDef::Scatter { count, .. } = def;
        let mut set = PlacementSet::with_capacity(count + usize::from(arche.centerpiece));
        if arche.centerpiece {
            set.push(Vec2::ZERO);
        }
        strat.place(*seed, &mut set);

        let visuals = CanopyHandles::for_archetype(arche, &mut meshes, &mut materials);
        let mut jitter = jitter_rng(seed.0, idx as u64);
        for p in set.points() {
            let yaw = jitter.random_range(0.0..std::f32::consts::TAU);
            let (s_min, s_max) = arche.scale;
            let scale = if s_max > s_min { jitter.random_range(s_min..s_max) } else { s_min };
            let transform = Transform {
                translation: Vec3::new(p.x, 0.0, p.y),
                rotation: Quat::from_rotation_y(yaw),
                scale: Vec3::splat(scale),
            };
            spawn_tree(&mut commands, &assets, &arche.render, visuals.as_ref(), transform);
        }

        debug!(
            "Forest: '{}' ({}) placed {}",
            arche.name,
            arche.category.as_deref().unwrap_or("uncategorized"),
            set.len()
        );
        spawned += set.len();
    }

    info!(
        "Forest: rebuilt with seed {}: dropped {}, spawned {} (region {:?})",
        seed.0, dropped, spawned, region
    );
}

/// Stable per (seed, archetype); yaw/scale jitter stays reproducible.
#[inline]
fn jitter_rng(seed: u64, arche: u64) -> ChaCha8Rng {
    let mix = seed ^ (arche << 24) ^ 0x51AF_E0B7_9C3D_22ADu64;
    ChaCha8Rng::seed_from_u64(mix)
}

/// Mesh/material handles shared by every instance of one Canopy archetype.
struct CanopyHandles {
    trunk_mesh: Handle<Mesh>,
    crown_mesh: Handle<Mesh>,
    trunk_mat: Handle<StandardMaterial>,
    crown_mat: Handle<StandardMaterial>,
    trunk_height: f32,
    crown_radius: f32,
}

impl CanopyHandles {
    fn for_archetype(
        arche: &TreeArchetypeDef,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Option<Self> {
        let RenderRef::Canopy {
            trunk_height,
            trunk_radius,
            crown_radius,
            trunk_color,
            crown_color,
        } = &arche.render
        else {
            return None;
        };

        let mut mat_for = |c: &[f32; 3]| {
            materials.add(StandardMaterial {
                base_color: Color::srgb(c[0], c[1], c[2]),
                perceptual_roughness: 1.0,
                ..default()
            })
        };
        let trunk_mat = mat_for(trunk_color);
        let crown_mat = mat_for(crown_color);

        Some(Self {
            trunk_mesh: meshes.add(Cylinder::new(*trunk_radius, *trunk_height)),
            crown_mesh: meshes.add(Sphere::new(*crown_radius)),
            trunk_mat,
            crown_mat,
            trunk_height: *trunk_height,
            crown_radius: *crown_radius,
        })
    }
}

fn spawn_tree(
    commands: &mut Commands,
    assets: &AssetServer,
    render: &RenderRef,
    visuals: Option<&CanopyHandles>,
    transform: Transform,
) {
    match render {
        RenderRef::Scene { path } => {
            commands.spawn((
                SceneRoot(assets.load(path.as_str())),
                transform,
                ForestTree,
            ));
        }
        RenderRef::Canopy { .. } => {
            let Some(v) = visuals else { return };
            commands
                .spawn((transform, Visibility::default(), ForestTree))
                .with_children(|parent| {
                    parent.spawn((
                        Mesh3d(v.trunk_mesh.clone()),
                        MeshMaterial3d(v.trunk_mat.clone()),
                        Transform::from_xyz(0.0, v.trunk_height * 0.5, 0.0),
                    ));
                    parent.spawn((
                        Mesh3d(v.crown_mesh.clone()),
                        MeshMaterial3d(v.crown_mat.clone()),
                        Transform::from_xyz(0.0, v.trunk_height + v.crown_radius * 0.6, 0.0),
                    ));
                });
        }
    }
}
