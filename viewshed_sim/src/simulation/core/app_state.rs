// viewshed_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. The scene is spawned from the scenario config.
    #[default]
    SceneBuilding,

    /// The scene is built. Observers tick their analyses every frame.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Ground and occluders.
    World,

    /// Pass 2: Observer entities and their analyzers.
    Observers,

    /// Pass 3: Leave the building state.
    Finalize,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Observers refresh their pose and spend their trace budget.
    Analysis,

    /// Completed runs are logged and collected.
    Reporting,

    /// Exit conditions are evaluated last.
    Lifecycle,
}
