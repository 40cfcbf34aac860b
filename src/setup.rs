use bevy::prelude::*;

use crate::forest::plugin::ForestSettings;
use crate::input::CameraOrbit;

#[derive(Component)]
pub struct MainCamera;

pub fn setup(
    mut commands: Commands,
    settings: Res<ForestSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(120.0, 260.0, 80.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Ground disc (the placement region lives inside its rim)
    commands.spawn((
        Mesh3d(meshes.add(Circle::new(settings.ground_radius))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.22, 0.33, 0.16),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    ));

    // 3) Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-60.0, 90.0, 180.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        CameraOrbit {
            focus: Vec3::ZERO,
            radius: 220.0,
            yaw: 0.3,
            pitch: 0.5,
        },
    ));
}
