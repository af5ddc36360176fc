// viewshed_core/src/lattice.rs

//! Deterministic generation of the angular/radial sample lattice.
//!
//! The lattice is a flat, ordered queue of [`TracePoint`]s. Within each distance
//! band (nearest first) the central vertical row is emitted first, followed by
//! every other row in increasing vertical index. Consumers that rebuild a 2-D
//! grid from a band rely on that order, so it must not change.

use nalgebra::{Point3, UnitVector3};
use tracing::debug;

use crate::config::{
    ViewshedConfig, MAX_DISTANCE_STEPS, MAX_SAMPLES_PER_AXIS, MAX_SAMPLES_PER_SECTION,
    MAX_SECTION_RATIO, MIN_SECTION_RATIO,
};
use crate::geometry::{compute_basis, direction_from_angles};
use crate::types::ObserverPose;

/// Smallest half-angle used for the far-plane extent, keeps `tan` away from zero.
const MIN_HALF_ANGLE_RAD: f64 = 1e-4;

/// One scheduled line-of-sight query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub trace_start: Point3<f64>,
    pub trace_end: Point3<f64>,
    /// 0-based, nearest band first.
    pub distance_band_index: u32,
    pub horizontal_index: u32,
    pub vertical_index: u32,
    /// Normal of a supporting surface under the target, if one was probed.
    /// The generator never probes, so this is always `None` here.
    pub ground_normal: Option<UnitVector3<f64>>,
}

/// Sizes derived from a configuration before any point is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatticeDimensions {
    pub horizontal_sections: u32,
    pub vertical_sections: u32,
    pub horizontal_samples: u32,
    pub vertical_samples: u32,
    pub distance_steps: u32,
}

impl LatticeDimensions {
    /// Computes section and sample counts for an (already sanitized) config.
    ///
    /// Horizontal samples are floored at `sections * min_samples_per_section`,
    /// vertical samples only at one per section. Both are capped at
    /// `sections * max_samples_per_section` and rounded up to a multiple of their
    /// section count so every section gets the same number of columns/rows.
    /// No axis ever exceeds [`MAX_SAMPLES_PER_AXIS`] rounded to whole sections.
    pub fn from_config(config: &ViewshedConfig) -> Self {
        let horizontal_sections = section_count(config.horizontal_section_ratio);
        let vertical_sections = section_count(config.vertical_section_ratio);

        let far_plane_width = far_plane_extent(config.max_distance, config.horizontal_fov_deg);
        let far_plane_height = far_plane_extent(config.max_distance, config.vertical_fov_deg);

        Self {
            horizontal_sections,
            vertical_sections,
            horizontal_samples: axis_sample_count(
                far_plane_width,
                config.max_sample_spacing,
                horizontal_sections,
                config.min_samples_per_section,
                config.max_samples_per_section,
            ),
            vertical_samples: axis_sample_count(
                far_plane_height,
                config.max_sample_spacing,
                vertical_sections,
                1,
                config.max_samples_per_section,
            ),
            distance_steps: config.distance_steps.min(MAX_DISTANCE_STEPS),
        }
    }

    /// Vertical index of the row at zero elevation, emitted first in each band.
    pub fn central_row(&self) -> u32 {
        self.vertical_samples / 2
    }

    pub fn samples_per_band(&self) -> usize {
        self.horizontal_samples as usize * self.vertical_samples as usize
    }

    pub fn total_samples(&self) -> usize {
        self.samples_per_band() * self.distance_steps as usize
    }
}

/// The generated queue together with the dimensions that produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lattice {
    dimensions: LatticeDimensions,
    points: Vec<TracePoint>,
}

impl Lattice {
    pub fn dimensions(&self) -> &LatticeDimensions {
        &self.dimensions
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points of one distance band, in emission order.
    pub fn band(&self, band: u32) -> Option<&[TracePoint]> {
        if band >= self.dimensions.distance_steps {
            return None;
        }
        let per_band = self.dimensions.samples_per_band();
        let start = band as usize * per_band;
        self.points.get(start..start + per_band)
    }
}

/// Number of angular sections needed when each covers `ratio` of the FOV.
pub fn section_count(ratio: f64) -> u32 {
    let ratio = if ratio.is_finite() {
        ratio.clamp(MIN_SECTION_RATIO, MAX_SECTION_RATIO)
    } else {
        MAX_SECTION_RATIO
    };
    ((1.0 / ratio).ceil() as u32).max(1)
}

fn far_plane_extent(max_distance: f64, fov_deg: f64) -> f64 {
    let half_angle = (fov_deg.to_radians() * 0.5).max(MIN_HALF_ANGLE_RAD);
    2.0 * max_distance * half_angle.tan()
}

fn axis_sample_count(
    extent: f64,
    spacing: f64,
    sections: u32,
    min_per_section: u32,
    max_per_section: u32,
) -> u32 {
    let sections = sections.max(1);
    let max_per_section = max_per_section
        .max(min_per_section)
        .min(MAX_SAMPLES_PER_SECTION);
    // Both limits are whole multiples of `sections`, so rounding up stays in range.
    let axis_cap = (MAX_SAMPLES_PER_AXIS / sections).max(1) * sections;
    let cap = sections.saturating_mul(max_per_section).min(axis_cap);
    let floor = sections.saturating_mul(min_per_section).min(cap);

    let raw = (extent / spacing).ceil() + 1.0;
    let raw = if raw.is_finite() && raw >= 0.0 {
        raw.min(cap as f64) as u32
    } else {
        cap
    };

    let count = raw.max(floor).min(cap);
    count.div_ceil(sections).saturating_mul(sections).min(cap)
}

fn lattice_angle(index: u32, count: u32, half_angle: f64) -> f64 {
    let alpha = if count <= 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    };
    -half_angle + alpha * (2.0 * half_angle)
}

/// Builds the full trace queue for one run.
///
/// Pure and deterministic: the same pose and config always yield the same
/// points in the same order.
pub fn generate_lattice(pose: &ObserverPose, config: &ViewshedConfig) -> Lattice {
    let config = config.sanitized();
    let dimensions = LatticeDimensions::from_config(&config);

    debug!(
        "Lattice: {} x {} samples ({} x {} sections) over {} bands",
        dimensions.horizontal_samples,
        dimensions.vertical_samples,
        dimensions.horizontal_sections,
        dimensions.vertical_sections,
        dimensions.distance_steps
    );

    let mut points = Vec::with_capacity(dimensions.total_samples());
    if dimensions.total_samples() == 0 {
        return Lattice { dimensions, points };
    }

    let basis = compute_basis(pose);
    let origin = pose.observer_location();
    let half_horizontal = (config.horizontal_fov_deg.to_radians() * 0.5).max(MIN_HALF_ANGLE_RAD);
    let half_vertical = (config.vertical_fov_deg.to_radians() * 0.5).max(MIN_HALF_ANGLE_RAD);

    let horizontal_angles: Vec<f64> = (0..dimensions.horizontal_samples)
        .map(|i| lattice_angle(i, dimensions.horizontal_samples, half_horizontal))
        .collect();
    let central_row = dimensions.central_row();

    // Central row first at zero elevation, then every remaining row.
    let rows: Vec<(u32, f64)> = std::iter::once((central_row, 0.0))
        .chain(
            (0..dimensions.vertical_samples)
                .filter(|&row| row != central_row)
                .map(|row| {
                    (
                        row,
                        lattice_angle(row, dimensions.vertical_samples, half_vertical),
                    )
                }),
        )
        .collect();

    for step in 0..dimensions.distance_steps {
        let current_distance =
            config.max_distance * (step + 1) as f64 / dimensions.distance_steps as f64;

        for &(vertical_index, vertical_angle) in &rows {
            for (horizontal_index, &horizontal_angle) in horizontal_angles.iter().enumerate() {
                let direction = direction_from_angles(&basis, horizontal_angle, vertical_angle);
                points.push(TracePoint {
                    trace_start: origin,
                    trace_end: origin + direction.into_inner() * current_distance,
                    distance_band_index: step,
                    horizontal_index: horizontal_index as u32,
                    vertical_index,
                    ground_normal: None,
                });
            }
        }
    }

    Lattice { dimensions, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn scenario_config() -> ViewshedConfig {
        ViewshedConfig {
            max_distance: 1000.0,
            horizontal_fov_deg: 90.0,
            vertical_fov_deg: 60.0,
            distance_steps: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_section_count_rounds_up() {
        assert_eq!(section_count(1.0), 1);
        assert_eq!(section_count(0.25), 4);
        assert_eq!(section_count(0.3), 4);
        assert_eq!(section_count(0.0), 100);
        assert_eq!(section_count(f64::NAN), 1);
    }

    #[test]
    fn test_sample_count_rounds_up_to_section_multiple() {
        // Far-plane width is 2000; a spacing of 350 gives ceil(5.71) + 1 = 7 raw samples.
        let config = ViewshedConfig {
            max_sample_spacing: 350.0,
            horizontal_section_ratio: 0.34,
            min_samples_per_section: 1,
            ..scenario_config()
        };
        let dims = LatticeDimensions::from_config(&config);
        assert_eq!(dims.horizontal_sections, 3);
        assert_eq!(dims.horizontal_samples, 9);
        assert_eq!(dims.horizontal_samples % dims.horizontal_sections, 0);
    }

    #[test]
    fn test_horizontal_floor_uses_min_samples_but_vertical_does_not() {
        let config = ViewshedConfig {
            max_sample_spacing: 100_000.0,
            horizontal_section_ratio: 0.5,
            vertical_section_ratio: 0.5,
            min_samples_per_section: 4,
            ..scenario_config()
        };
        let dims = LatticeDimensions::from_config(&config);
        assert_eq!(dims.horizontal_samples, 8);
        assert_eq!(dims.vertical_samples, 2);
    }

    #[test]
    fn test_sample_count_is_capped_per_section() {
        let config = ViewshedConfig {
            max_sample_spacing: 0.0,
            horizontal_section_ratio: 0.5,
            max_samples_per_section: 10,
            ..scenario_config()
        };
        let dims = LatticeDimensions::from_config(&config.sanitized());
        assert_eq!(dims.horizontal_samples, 20);
    }

    #[test]
    fn test_extreme_config_stays_bounded() {
        let config = ViewshedConfig {
            horizontal_section_ratio: 0.03,
            max_distance: 1e12,
            max_sample_spacing: 0.01,
            max_samples_per_section: u32::MAX,
            distance_steps: u32::MAX,
            ..Default::default()
        };
        for dims in [
            LatticeDimensions::from_config(&config),
            LatticeDimensions::from_config(&config.sanitized()),
        ] {
            assert_eq!(dims.horizontal_sections, 34);
            assert_eq!(dims.horizontal_samples, 170);
            assert_eq!(dims.horizontal_samples % dims.horizontal_sections, 0);
            assert!(dims.vertical_samples <= MAX_SAMPLES_PER_AXIS);
            assert_eq!(dims.vertical_samples % dims.vertical_sections, 0);
            assert_eq!(dims.distance_steps, MAX_DISTANCE_STEPS);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let pose = ObserverPose::looking_along_x(Point3::new(3.0, -2.0, 1.0), 150.0);
        let config = ViewshedConfig::default();
        let first = generate_lattice(&pose, &config);
        let second = generate_lattice(&pose, &config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_queue_length_matches_dimensions() {
        let lattice = generate_lattice(&ObserverPose::default(), &ViewshedConfig::default());
        let dims = lattice.dimensions();
        assert_eq!(lattice.len(), dims.total_samples());
        assert_eq!(
            lattice.len(),
            (dims.horizontal_samples * dims.vertical_samples * dims.distance_steps) as usize
        );
    }

    #[test]
    fn test_each_band_starts_with_the_central_row() {
        let lattice = generate_lattice(&ObserverPose::default(), &ViewshedConfig::default());
        let dims = *lattice.dimensions();
        for band in 0..dims.distance_steps {
            let points = lattice.band(band).unwrap();
            let central = &points[..dims.horizontal_samples as usize];
            for (i, point) in central.iter().enumerate() {
                assert_eq!(point.vertical_index, dims.central_row());
                assert_eq!(point.horizontal_index, i as u32);
                assert_eq!(point.distance_band_index, band);
            }
            assert!(points[dims.horizontal_samples as usize..]
                .iter()
                .all(|p| p.vertical_index != dims.central_row()));
        }
        assert!(lattice.band(dims.distance_steps).is_none());
    }

    #[test]
    fn test_off_center_rows_follow_in_increasing_order() {
        let lattice = generate_lattice(&ObserverPose::default(), &scenario_config());
        let dims = *lattice.dimensions();
        let rows: Vec<u32> = lattice.points()[dims.horizontal_samples as usize..]
            .iter()
            .step_by(dims.horizontal_samples as usize)
            .map(|p| p.vertical_index)
            .collect();
        let expected: Vec<u32> = (0..dims.vertical_samples)
            .filter(|&r| r != dims.central_row())
            .collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_bands_are_nearest_first_at_even_fractions() {
        let config = ViewshedConfig {
            distance_steps: 4,
            ..scenario_config()
        };
        let pose = ObserverPose::looking_along_x(Point3::origin(), 10.0);
        let lattice = generate_lattice(&pose, &config);
        let origin = pose.observer_location();
        for band in 0..4 {
            let expected = 1000.0 * (band + 1) as f64 / 4.0;
            for point in lattice.band(band).unwrap() {
                assert_eq!(point.trace_start, origin);
                assert_abs_diff_eq!((point.trace_end - origin).norm(), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_central_row_spans_the_horizontal_fov() {
        let lattice = generate_lattice(&ObserverPose::default(), &scenario_config());
        let dims = *lattice.dimensions();
        let row = &lattice.points()[..dims.horizontal_samples as usize];

        let first = row.first().unwrap().trace_end.coords;
        let last = row.last().unwrap().trace_end.coords;
        // Extremes sit at -45 and +45 degrees of yaw with zero elevation.
        assert_abs_diff_eq!(first.y.atan2(first.x), -45f64.to_radians(), epsilon = 1e-9);
        assert_abs_diff_eq!(last.y.atan2(last.x), 45f64.to_radians(), epsilon = 1e-9);
        assert!(row.iter().all(|p| p.trace_end.z.abs() < 1e-9));
        assert!(row.iter().all(|p| p.ground_normal.is_none()));
    }

    #[test]
    fn test_minimal_lattice_straddles_forward() {
        // A huge spacing still yields two samples per axis: ceil(extent / spacing) + 1.
        let config = ViewshedConfig {
            horizontal_fov_deg: 10.0,
            vertical_fov_deg: 10.0,
            horizontal_section_ratio: 1.0,
            vertical_section_ratio: 1.0,
            max_sample_spacing: 1.0e9,
            min_samples_per_section: 1,
            ..scenario_config()
        };
        let lattice = generate_lattice(&ObserverPose::default(), &config);
        let dims = *lattice.dimensions();
        assert_eq!((dims.horizontal_samples, dims.vertical_samples), (2, 2));
        assert_eq!(lattice.len(), 4);

        // Central row (index 1) is level, the remaining row (index 0) looks down.
        let points = lattice.points();
        assert_eq!(points[0].vertical_index, 1);
        assert_abs_diff_eq!(points[0].trace_end.z, 0.0, epsilon = 1e-9);
        assert_eq!(points[2].vertical_index, 0);
        assert!(points[2].trace_end.z < 0.0);
        let midpoint = (points[0].trace_end.coords + points[1].trace_end.coords) * 0.5;
        assert_abs_diff_eq!(midpoint.y, 0.0, epsilon = 1e-9);
        assert!(midpoint.dot(&Vector3::x()) > 0.0);
    }

    #[test]
    fn test_zero_distance_steps_yield_empty_queue() {
        let config = ViewshedConfig {
            distance_steps: 0,
            ..Default::default()
        };
        let lattice = generate_lattice(&ObserverPose::default(), &config);
        assert!(lattice.is_empty());
        assert!(lattice.band(0).is_none());
    }
}
