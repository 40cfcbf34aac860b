use bevy::prelude::*;

mod forest;
mod input;
mod setup;
mod ui;

use forest::ForestPlugin;
use input::camera_controller;
use ui::{panel_input, refresh_panel_text, spawn_panel};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        // forest placement + rebuild-on-change
        .add_plugins(ForestPlugin)
        // camera, light, ground disc + the parameter panel
        .add_systems(Startup, (setup::setup, spawn_panel))
        .add_systems(Update, (camera_controller, panel_input, refresh_panel_text))
        .run();
}
