// viewshed_sim/src/simulation/core/events.rs

use bevy::prelude::{Entity, Event};
use viewshed_core::aggregate::VisibilitySummary;
use viewshed_core::trace::ViewshedPoint;

/// Sent once for every completed analysis run of an observer.
#[derive(Event, Debug, Clone)]
pub struct ViewshedCompleted {
    pub observer: Entity,
    pub name: String,
    /// Number of runs this observer has completed, including this one.
    pub run: u64,
    pub summary: VisibilitySummary,
    pub results: Vec<ViewshedPoint>,
}

/// Host-side controls for one observer's analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewshedAction {
    Start,
    Stop,
    Clear,
}

/// Request to start, stop or clear the analysis of `observer`.
///
/// Applied in `SimulationSet::Analysis` before the frame's tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct ViewshedCommand {
    pub observer: Entity,
    pub action: ViewshedAction,
}
