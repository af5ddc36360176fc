// viewshed_sim/src/lib.rs

use bevy::prelude::*;

use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::viewshed::ViewshedPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the viewshed_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Expects a [`ScenarioConfig`](crate::simulation::config::ScenarioConfig)
/// resource to be inserted before it is added.
pub struct ViewshedSimulationPlugin;

impl Plugin for ViewshedSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // States, schedules, the seeded RNG and the exit conditions.
            SimulationSetupPlugin,
            // Ground slab and scattered occluders.
            WorldSpawnerPlugin,
            // Observers and their incremental analysis.
            ViewshedPlugin,
        ));
    }
}
