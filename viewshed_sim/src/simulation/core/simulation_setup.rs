// viewshed_sim/src/simulation/core/simulation_setup.rs

use std::collections::HashSet;

use bevy::app::AppExit;
use bevy::diagnostic::FrameCount;

use crate::prelude::*;
use crate::simulation::config::ScenarioConfig;

pub struct SimulationSetupPlugin;

/// Observers that have completed at least one analysis run.
#[derive(Resource, Default, Debug)]
pub struct CompletedObservers(pub HashSet<Entity>);

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // This plugin's job is to read the config and add resources and schedules.
        let seed = match app.world().get_resource::<ScenarioConfig>() {
            Some(config) => config.simulation.seed,
            None => {
                warn!("No ScenarioConfig inserted before SimulationSetupPlugin; using defaults.");
                app.init_resource::<ScenarioConfig>();
                None
            }
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        app.insert_resource(SimulationRng::from_seed(seed));

        // --- 2. Resources & events ---
        app.init_resource::<CompletedObservers>()
            .add_event::<ViewshedCompleted>()
            .add_event::<ViewshedCommand>();

        // --- 3. Spawning pipeline ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::World,
                SceneBuildSet::Observers,
                SceneBuildSet::Finalize,
            )
                .chain(),
        );
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            transition_to_running.in_set(SceneBuildSet::Finalize),
        );

        // --- 4. Runtime schedule ---
        app.configure_sets(
            Update,
            (
                SimulationSet::Analysis,
                SimulationSet::Reporting,
                SimulationSet::Lifecycle,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );
        app.add_systems(
            Update,
            check_exit_conditions.in_set(SimulationSet::Lifecycle),
        );
    }
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn check_exit_conditions(
    config: Res<ScenarioConfig>,
    frames: Res<FrameCount>,
    completed: Res<CompletedObservers>,
    observers: Query<(), With<ViewshedObserver>>,
    mut exit: EventWriter<AppExit>,
) {
    let observer_count = observers.iter().count();
    if config.simulation.exit_on_complete
        && observer_count > 0
        && completed.0.len() >= observer_count
    {
        info!(
            "All {} observers completed an analysis. Exiting.",
            observer_count
        );
        exit.write(AppExit::Success);
        return;
    }

    if let Some(max_frames) = config.simulation.max_frames {
        if u64::from(frames.0) >= max_frames {
            warn!(
                "Frame limit of {} reached with {}/{} observers complete. Exiting.",
                max_frames,
                completed.0.len(),
                observer_count
            );
            exit.write(AppExit::Success);
        }
    }
}
