// viewshed_core/src/trace.rs

use nalgebra::{Point3, Vector3};

use crate::lattice::TracePoint;
use crate::types::HitIdentity;

/// A hit this close to (or beyond) the intended target counts as having
/// reached it. Kept as an absolute distance in world units.
pub const HIT_DISTANCE_TOLERANCE: f64 = 5.0;

/// Traces shorter than this are treated as degenerate.
const DEGENERATE_TRACE_LENGTH: f64 = 1e-4;

/// Represents the first blocking hit reported by the ray-cast backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub location: Point3<f64>,
    pub normal: Vector3<f64>,
    pub identity: Option<HitIdentity>,
}

/// The contract for the scene query backend.
///
/// One single-hit, simple-collision line cast on the visibility channel from
/// `start` to `end`, skipping whatever `ignore` names. Returns `None` when the
/// segment is clear.
pub trait TraceVisibility {
    fn trace(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        ignore: Option<HitIdentity>,
    ) -> Option<TraceHit>;
}

impl<F> TraceVisibility for F
where
    F: Fn(&Point3<f64>, &Point3<f64>, Option<HitIdentity>) -> Option<TraceHit>,
{
    fn trace(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        ignore: Option<HitIdentity>,
    ) -> Option<TraceHit> {
        self(start, end, ignore)
    }
}

/// Direct line-of-sight test between two points.
pub fn is_point_visible(
    tracer: &dyn TraceVisibility,
    viewer: &Point3<f64>,
    target: &Point3<f64>,
    ignore: Option<HitIdentity>,
) -> bool {
    tracer.trace(viewer, target, ignore).is_none()
}

/// Which visibility rule a trace fell under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceClassification {
    /// Nothing was hit.
    Clear,
    /// Something was hit but the segment had no length.
    Anchored,
    /// The hit is within [`HIT_DISTANCE_TOLERANCE`] of the target, or past it.
    /// The ray struck the target's own supporting surface.
    ReachedTarget(TraceHit),
    /// An occluder stopped the ray short of the target.
    Occluded(TraceHit),
}

impl TraceClassification {
    pub fn is_visible(&self) -> bool {
        !matches!(self, TraceClassification::Occluded(_))
    }
}

/// Applies the visibility rules to the backend's answer for one trace.
pub fn classify_trace(trace: &TracePoint, hit: Option<TraceHit>) -> TraceClassification {
    let Some(hit) = hit else {
        return TraceClassification::Clear;
    };

    let trace_length = (trace.trace_end - trace.trace_start).norm();
    if trace_length <= DEGENERATE_TRACE_LENGTH {
        return TraceClassification::Anchored;
    }

    let hit_distance = (hit.location - trace.trace_start).norm();
    if hit_distance >= trace_length - HIT_DISTANCE_TOLERANCE {
        TraceClassification::ReachedTarget(hit)
    } else {
        TraceClassification::Occluded(hit)
    }
}

/// One classified sample of the viewshed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewshedPoint {
    /// The intended target, before tracing.
    pub world_position: Point3<f64>,
    pub is_visible: bool,
    /// Straight-line distance from the observer to `world_position`.
    pub distance: f64,
    /// Where the trace ended up: the surface hit, or the target itself.
    pub hit_location: Point3<f64>,
    /// Zero when nothing was hit and no ground normal was carried.
    pub hit_normal: Vector3<f64>,
    pub hit_identity: Option<HitIdentity>,
}

impl Default for ViewshedPoint {
    fn default() -> Self {
        Self {
            world_position: Point3::origin(),
            is_visible: false,
            distance: 0.0,
            hit_location: Point3::origin(),
            hit_normal: Vector3::zeros(),
            hit_identity: None,
        }
    }
}

impl ViewshedPoint {
    /// The placeholder written for every target when a run starts.
    pub fn pending(observer: &Point3<f64>, target: &Point3<f64>) -> Self {
        Self {
            world_position: *target,
            distance: (target - observer).norm(),
            hit_location: *target,
            ..Default::default()
        }
    }

    /// Records the outcome of `trace`. Called exactly once per run for each point.
    pub fn apply(&mut self, trace: &TracePoint, classification: TraceClassification) {
        let carried_normal = trace.ground_normal.map(|n| n.into_inner());

        match classification {
            TraceClassification::Clear | TraceClassification::Anchored => {
                self.is_visible = true;
                self.hit_location = trace.trace_end;
                self.hit_normal = carried_normal.unwrap_or_else(Vector3::zeros);
                self.hit_identity = None;
            }
            TraceClassification::ReachedTarget(hit) => {
                self.is_visible = true;
                self.hit_location = hit.location;
                self.hit_normal = carried_normal.unwrap_or(hit.normal);
                self.hit_identity = hit.identity;
            }
            TraceClassification::Occluded(hit) => {
                self.is_visible = false;
                self.hit_location = hit.location;
                self.hit_normal = hit.normal;
                self.hit_identity = hit.identity;
            }
        }
    }
}
