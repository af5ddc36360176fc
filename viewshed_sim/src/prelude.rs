// viewshed_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the viewshed_core prelude so pure types like `ObserverPose`,
// `ViewshedAnalyzer` and `TraceVisibility` are at hand.
pub use viewshed_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::events::{ViewshedAction, ViewshedCommand, ViewshedCompleted};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::plugins::viewshed::ViewshedObserver;
