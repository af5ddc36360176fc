// viewshed_sim/src/simulation/config/structs.rs

use bevy::prelude::{Resource, Transform};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;
use viewshed_core::config::{SchedulerConfig, ViewshedConfig};

use crate::simulation::core::transforms::enu_iso_to_bevy_transform;
use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The Bevy resource holding everything parsed from a `scenario.toml` file.
/// All positions and sizes are in the ENU frame, in meters.
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: SimulationSection,

    #[serde(default)]
    pub world: WorldConfig,

    // The TOML has `[[observers]]`, which becomes a Vec of ObserverConfig structs.
    #[serde(default)]
    pub observers: Vec<ObserverConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSection {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Hard stop after this many frames. `None` runs until another exit condition.
    #[serde(default = "default_max_frames")]
    pub max_frames: Option<u64>,
    /// Exit once every observer has completed at least one analysis.
    #[serde(default = "default_true")]
    pub exit_on_complete: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: None,
            max_frames: default_max_frames(),
            exit_on_complete: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Side length of the square ground slab, centered on the origin.
    pub ground_extent: f64,
    /// How many box occluders to scatter.
    pub occluder_count: u32,
    /// Occluders are placed within this radius of the origin.
    pub spawn_radius: f64,
    /// No occluder center is placed closer than this to any observer.
    pub keep_out_radius: f64,
    /// Smallest box size, `[east, north, up]`.
    pub occluder_size_min: [f64; 3],
    /// Largest box size, `[east, north, up]`.
    pub occluder_size_max: [f64; 3],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_extent: 1200.0,
            occluder_count: 24,
            spawn_radius: 450.0,
            keep_out_radius: 20.0,
            occluder_size_min: [4.0, 4.0, 3.0],
            occluder_size_max: [30.0, 30.0, 25.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    /// Eye height above the observer's base.
    #[serde(default = "default_observer_height")]
    pub observer_height: f64,
    #[serde(default)]
    pub viewshed: ViewshedConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Observers without auto-update get one run started when the simulation
    /// begins. Set to false to leave them idle until a `ViewshedCommand`.
    #[serde(default = "default_start_immediately")]
    pub start_immediately: bool,
}

fn default_start_immediately() -> bool {
    true
}

// =========================================================================
// == Helper Structs for Nested Configuration ==
// =========================================================================

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct Pose {
    #[serde(deserialize_with = "serde_helpers::vec3_from_array", default)]
    pub translation: Vector3<f64>,

    /// `[roll, pitch, yaw]` in degrees. Identity faces east.
    #[serde(deserialize_with = "serde_helpers::quat_from_euler_deg", default)]
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn to_bevy_transform(&self) -> Transform {
        enu_iso_to_bevy_transform(&self.to_isometry())
    }
}

fn default_max_frames() -> Option<u64> {
    Some(3600)
}

fn default_true() -> bool {
    true
}

fn default_observer_height() -> f64 {
    1.5
}
