// viewshed_core/src/aggregate.rs

//! Read-only queries over a results buffer.
//!
//! These work on any slice of [`ViewshedPoint`], so they can be pointed at a
//! partially filled buffer or at a snapshot handed to a completion callback.

use nalgebra::Point3;

use crate::trace::ViewshedPoint;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibilitySummary {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
    /// `100 * visible / total`, or zero for an empty buffer.
    pub percentage: f64,
}

pub fn count_visible(results: &[ViewshedPoint]) -> usize {
    results.iter().filter(|p| p.is_visible).count()
}

pub fn count_hidden(results: &[ViewshedPoint]) -> usize {
    results.iter().filter(|p| !p.is_visible).count()
}

pub fn visibility_percentage(results: &[ViewshedPoint]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    100.0 * count_visible(results) as f64 / results.len() as f64
}

pub fn summarize(results: &[ViewshedPoint]) -> VisibilitySummary {
    let visible = count_visible(results);
    VisibilitySummary {
        total: results.len(),
        visible,
        hidden: results.len() - visible,
        percentage: visibility_percentage(results),
    }
}

pub fn visible_points(results: &[ViewshedPoint]) -> Vec<ViewshedPoint> {
    results.iter().filter(|p| p.is_visible).copied().collect()
}

pub fn hidden_points(results: &[ViewshedPoint]) -> Vec<ViewshedPoint> {
    results.iter().filter(|p| !p.is_visible).copied().collect()
}

/// Points whose `distance` lies in `[min_distance, max_distance]`, in buffer order.
pub fn filter_by_distance(
    results: &[ViewshedPoint],
    min_distance: f64,
    max_distance: f64,
) -> Vec<ViewshedPoint> {
    results
        .iter()
        .filter(|p| p.distance >= min_distance && p.distance <= max_distance)
        .copied()
        .collect()
}

/// The visible point whose `world_position` is closest to `location`.
/// Ties go to the earliest point in the buffer.
pub fn find_nearest_visible<'a>(
    results: &'a [ViewshedPoint],
    location: &Point3<f64>,
) -> Option<&'a ViewshedPoint> {
    let mut nearest: Option<(&ViewshedPoint, f64)> = None;
    for point in results.iter().filter(|p| p.is_visible) {
        let distance_sq = (point.world_position - location).norm_squared();
        match nearest {
            Some((_, best)) if distance_sq >= best => {}
            _ => nearest = Some((point, distance_sq)),
        }
    }
    nearest.map(|(point, _)| point)
}
