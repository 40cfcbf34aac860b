use bevy::prelude::*;
use bevy::ui::BackgroundColor;

use crate::forest::core::ForestSeed;
use crate::forest::plugin::ForestSettings;

#[derive(Component)]
pub struct PanelText;

const DENSITY_STEP: f32 = 0.25;
const DENSITY_MIN: f32 = 0.25;
const DENSITY_MAX: f32 = 4.0;
const MARGIN_STEP: f32 = 10.0;

pub fn spawn_panel(mut commands: Commands, settings: Res<ForestSettings>) {
    commands
        .spawn((
            // Anchored parameter panel
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::linear_rgba(0.0, 0.0, 0.0, 0.55)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(panel_text(&settings, ForestSeed(settings.world_seed))),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                PanelText,
            ));
        });
}

/// Every handled key mutates a resource; change detection then triggers the
/// full forest rebuild.
pub fn panel_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<ForestSettings>,
    mut seed: ResMut<ForestSeed>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        seed.0 = seed.0.wrapping_add(1);
        info!("Forest: reseed -> {}", seed.0);
    }
    if keys.just_pressed(KeyCode::KeyN) {
        settings.density = (settings.density - DENSITY_STEP).max(DENSITY_MIN);
        info!("Forest: density -> {:.2}", settings.density);
    }
    if keys.just_pressed(KeyCode::KeyM) {
        settings.density = (settings.density + DENSITY_STEP).min(DENSITY_MAX);
        info!("Forest: density -> {:.2}", settings.density);
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        settings.edge_margin = (settings.edge_margin - MARGIN_STEP).max(0.0);
        info!("Forest: edge margin -> {:.0}", settings.edge_margin);
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        let cap = settings.ground_radius - MARGIN_STEP;
        settings.edge_margin = (settings.edge_margin + MARGIN_STEP).min(cap);
        info!("Forest: edge margin -> {:.0}", settings.edge_margin);
    }
}

pub fn refresh_panel_text(
    settings: Res<ForestSettings>,
    seed: Res<ForestSeed>,
    mut query: Query<&mut Text, With<PanelText>>,
) {
    if !settings.is_changed() && !seed.is_changed() {
        return;
    }
    let Ok(mut text) = query.single_mut() else { return; };
    text.0 = panel_text(&settings, *seed);
}

fn panel_text(settings: &ForestSettings, seed: ForestSeed) -> String {
    format!(
        "grove\n\
         seed    {}\n\
         density {:.2}\n\
         margin  {:.0} m\n\
         \n\
         R reseed | N/M density | [ ] margin\n\
         WASD pan | wheel zoom | middle-drag orbit",
        seed.0, settings.density, settings.edge_margin
    )
}
