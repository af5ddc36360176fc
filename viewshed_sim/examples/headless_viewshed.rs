// viewshed_sim/examples/headless_viewshed.rs

//! Runs a scenario's observers headless until each one has completed an
//! analysis, logging the visibility summaries.
//!
//! To run this example:
//! `cargo run --example headless_viewshed -- --scenario assets/scenarios/watchtower.toml`

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{
    app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, scene::ScenePlugin,
    state::app::StatesPlugin,
};
use clap::Parser;

use viewshed_sim::cli::Cli;
use viewshed_sim::prelude::AppState;
use viewshed_sim::simulation::config::load_scenario;
use viewshed_sim::ViewshedSimulationPlugin;

fn main() -> AppExit {
    let cli = Cli::parse();
    println!("Loading scenario from: {}", cli.scenario.display());

    let mut config = match load_scenario(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load scenario '{}': {}", cli.scenario.display(), e);
            return AppExit::error();
        }
    };
    if let Some(max_frames) = cli.max_frames {
        config.simulation.max_frames = Some(max_frames);
    }

    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        LogPlugin {
            level: bevy::log::Level::INFO,
            filter: "info,viewshed_sim=debug,viewshed_core=info".to_string(),
            ..default()
        },
        TransformPlugin,
        AssetPlugin::default(),
        ScenePlugin,
        StatesPlugin,
    ))
    // The collider backend reads mesh assets even when none are used.
    .init_asset::<Mesh>()
    // Physics steps every frame so spatial queries see colliders spawned
    // during scene building on the very next frame.
    .add_plugins(PhysicsPlugins::new(PostUpdate))
    .insert_resource(config);

    app.init_state::<AppState>();

    app.add_plugins(ViewshedSimulationPlugin);

    println!("Starting viewshed simulation...");
    app.run()
}
