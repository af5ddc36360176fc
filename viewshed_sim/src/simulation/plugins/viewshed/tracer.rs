// viewshed_sim/src/simulation/plugins/viewshed/tracer.rs

use avian3d::prelude::{SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use nalgebra::Point3;

use viewshed_core::trace::{TraceHit, TraceVisibility};
use viewshed_core::types::HitIdentity;

use crate::simulation::core::transforms::{
    bevy_point_to_enu_point, bevy_vector_to_enu_vector, enu_point_to_bevy_point,
};

/// Segments shorter than this are never cast.
const MIN_CAST_LENGTH: f32 = 1e-6;

/// Answers visibility traces with avian's spatial query pipeline.
///
/// Points come in and go out in the ENU frame; the cast itself happens in
/// Bevy's frame. Casts are solid and return the first hit only.
pub struct SpatialQueryTracer<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
}

impl<'a, 'w, 's> SpatialQueryTracer<'a, 'w, 's> {
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>) -> Self {
        Self { spatial_query }
    }
}

impl TraceVisibility for SpatialQueryTracer<'_, '_, '_> {
    fn trace(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        ignore: Option<HitIdentity>,
    ) -> Option<TraceHit> {
        let origin = enu_point_to_bevy_point(start);
        let delta = enu_point_to_bevy_point(end) - origin;
        let length = delta.length();
        if length <= MIN_CAST_LENGTH {
            return None;
        }
        let direction = Dir3::new(delta).ok()?;

        let filter = match ignore {
            Some(identity) => SpatialQueryFilter::from_excluded_entities([identity.to_entity()]),
            None => SpatialQueryFilter::default(),
        };

        let hit = self
            .spatial_query
            .cast_ray(origin, direction, length, true, &filter)?;

        Some(TraceHit {
            location: bevy_point_to_enu_point(&(origin + direction * hit.distance)),
            normal: bevy_vector_to_enu_vector(&hit.normal),
            identity: Some(HitIdentity::from_entity(hit.entity)),
        })
    }
}
