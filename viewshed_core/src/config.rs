// viewshed_core/src/config.rs

use serde::Deserialize;

// --- Safe ranges used when clamping configuration ---
pub const MIN_MAX_DISTANCE: f64 = 1.0;
pub const MIN_FOV_DEG: f64 = 1.0;
pub const MAX_FOV_DEG: f64 = 179.0;
pub const MIN_SECTION_RATIO: f64 = 0.01;
pub const MAX_SECTION_RATIO: f64 = 1.0;
pub const MIN_SAMPLE_SPACING: f64 = 0.01;
pub const MIN_UPDATE_INTERVAL_SECS: f64 = 0.1;
pub const MAX_SAMPLES_PER_SECTION: u32 = 200;
/// Hard ceiling on samples along one axis, whatever the section count.
pub const MAX_SAMPLES_PER_AXIS: u32 = 200;
pub const MAX_DISTANCE_STEPS: u32 = 50;

/// The parameter bundle that shapes the sample lattice.
///
/// Nothing here is ever rejected. Out-of-range or non-finite values are pulled
/// back into a safe range by [`ViewshedConfig::sanitized`], which the lattice
/// generator applies before it reads any field.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewshedConfig {
    /// Range of the farthest distance band, in world units.
    pub max_distance: f64,
    /// Full horizontal field of view in degrees.
    pub horizontal_fov_deg: f64,
    /// Full vertical field of view in degrees.
    pub vertical_fov_deg: f64,
    /// Number of radial shells between the observer and `max_distance`.
    /// Zero produces an empty lattice. Capped at [`MAX_DISTANCE_STEPS`].
    pub distance_steps: u32,
    /// Fraction of the horizontal FOV covered by one angular section.
    pub horizontal_section_ratio: f64,
    /// Fraction of the vertical FOV covered by one angular section.
    pub vertical_section_ratio: f64,
    /// Desired worst-case distance between neighbouring far-plane samples.
    pub max_sample_spacing: f64,
    /// Lower bound on horizontal samples per section.
    pub min_samples_per_section: u32,
    /// Upper bound on samples per section on either axis.
    pub max_samples_per_section: u32,
}

impl Default for ViewshedConfig {
    fn default() -> Self {
        Self {
            max_distance: 5000.0,
            horizontal_fov_deg: 90.0,
            vertical_fov_deg: 60.0,
            distance_steps: 5,
            horizontal_section_ratio: 0.25,
            vertical_section_ratio: 0.5,
            max_sample_spacing: 250.0,
            min_samples_per_section: 3,
            max_samples_per_section: 64,
        }
    }
}

impl ViewshedConfig {
    /// Returns a copy with every field clamped into its safe range.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let min_samples_per_section = self
            .min_samples_per_section
            .clamp(1, MAX_SAMPLES_PER_SECTION);

        Self {
            max_distance: clamp_finite(
                self.max_distance,
                MIN_MAX_DISTANCE,
                f64::MAX,
                defaults.max_distance,
            ),
            horizontal_fov_deg: clamp_finite(
                self.horizontal_fov_deg,
                MIN_FOV_DEG,
                MAX_FOV_DEG,
                defaults.horizontal_fov_deg,
            ),
            vertical_fov_deg: clamp_finite(
                self.vertical_fov_deg,
                MIN_FOV_DEG,
                MAX_FOV_DEG,
                defaults.vertical_fov_deg,
            ),
            distance_steps: self.distance_steps.min(MAX_DISTANCE_STEPS),
            horizontal_section_ratio: clamp_finite(
                self.horizontal_section_ratio,
                MIN_SECTION_RATIO,
                MAX_SECTION_RATIO,
                MAX_SECTION_RATIO,
            ),
            vertical_section_ratio: clamp_finite(
                self.vertical_section_ratio,
                MIN_SECTION_RATIO,
                MAX_SECTION_RATIO,
                MAX_SECTION_RATIO,
            ),
            max_sample_spacing: clamp_finite(
                self.max_sample_spacing,
                MIN_SAMPLE_SPACING,
                f64::MAX,
                defaults.max_sample_spacing,
            ),
            min_samples_per_section,
            max_samples_per_section: self
                .max_samples_per_section
                .clamp(min_samples_per_section, MAX_SAMPLES_PER_SECTION),
        }
    }
}

/// How the analyzer spends its time across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Upper bound on traces executed by a single `tick`.
    pub max_traces_per_tick: u32,
    /// Start a fresh analysis every `update_interval_secs` while idle.
    pub auto_update: bool,
    pub update_interval_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_traces_per_tick: 50,
            auto_update: true,
            update_interval_secs: 2.0,
        }
    }
}

impl SchedulerConfig {
    pub fn sanitized(&self) -> Self {
        Self {
            max_traces_per_tick: self.max_traces_per_tick.max(1),
            auto_update: self.auto_update,
            update_interval_secs: clamp_finite(
                self.update_interval_secs,
                MIN_UPDATE_INTERVAL_SECS,
                f64::MAX,
                Self::default().update_interval_secs,
            ),
        }
    }
}

fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
