// viewshed_core/src/geometry.rs

//! Observer basis and angle-to-direction mapping.

use nalgebra::{Unit, UnitQuaternion, UnitVector3};

use crate::types::ObserverPose;

/// An orthonormal, right-handed view basis: `right x forward == up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverBasis {
    pub forward: UnitVector3<f64>,
    pub right: UnitVector3<f64>,
    pub up: UnitVector3<f64>,
}

/// Re-orthogonalizes the pose's forward/up pair into a full basis.
///
/// Called for every lattice rather than cached, so a pose that moved between
/// runs is always picked up.
pub fn compute_basis(pose: &ObserverPose) -> ObserverBasis {
    let forward = pose.forward().into_inner();
    let right = forward.cross(&pose.up_reference().into_inner()).normalize();
    let up = right.cross(&forward).normalize();

    ObserverBasis {
        forward: Unit::new_unchecked(forward),
        right: Unit::new_unchecked(right),
        up: Unit::new_unchecked(up),
    }
}

/// Maps a (horizontal, vertical) angle pair in radians to a unit direction.
///
/// Yaw is applied first, about `up`. Pitch is then applied about the right
/// vector of the *yawed* direction, not the original `right`, so the two angles
/// interact and the frustum's vertical edges are slightly curved.
pub fn direction_from_angles(
    basis: &ObserverBasis,
    horizontal_angle_rad: f64,
    vertical_angle_rad: f64,
) -> UnitVector3<f64> {
    let yaw = UnitQuaternion::from_axis_angle(&basis.up, horizontal_angle_rad);
    let yawed = yaw * basis.forward.into_inner();

    let rotated_right = Unit::new_normalize(yawed.cross(&basis.up.into_inner()));
    let pitch = UnitQuaternion::from_axis_angle(&rotated_right, vertical_angle_rad);

    Unit::new_normalize(pitch * yawed)
}
