// viewshed_sim/src/simulation/core/transforms.rs

//! Conversions between the analysis frame (ENU: X east, Y north, Z up) and
//! Bevy's world frame (X right, Y up, -Z forward).
//!
//! ENU `(e, n, u)` maps to Bevy `(e, u, -n)`. The mapping is a proper rotation
//! (-90 degrees about X), so orientations convert by rotating the quaternion's
//! vector part with the same mapping.

use bevy::prelude::{GlobalTransform, Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};

// --- Vectors & points ---

pub fn enu_vector_to_bevy_vector(enu: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(enu.x as f32, enu.z as f32, -enu.y as f32)
}

pub fn bevy_vector_to_enu_vector(bevy: &BevyVec3) -> Vector3<f64> {
    Vector3::new(bevy.x as f64, -bevy.z as f64, bevy.y as f64)
}

pub fn enu_point_to_bevy_point(enu: &Point3<f64>) -> BevyVec3 {
    enu_vector_to_bevy_vector(&enu.coords)
}

pub fn bevy_point_to_enu_point(bevy: &BevyVec3) -> Point3<f64> {
    Point3::from(bevy_vector_to_enu_vector(bevy))
}

// --- Orientations ---

/// Converts an object's orientation from the ENU frame to the Bevy frame.
pub fn enu_quat_to_bevy_quat(enu: &UnitQuaternion<f64>) -> BevyQuat {
    let axis = enu_vector_to_bevy_vector(&enu.imag());
    BevyQuat::from_xyzw(axis.x, axis.y, axis.z, enu.scalar() as f32).normalize()
}

/// Converts an object's orientation from the Bevy frame to the ENU frame.
pub fn bevy_quat_to_enu_quat(bevy: &BevyQuat) -> UnitQuaternion<f64> {
    let axis = bevy_vector_to_enu_vector(&BevyVec3::new(bevy.x, bevy.y, bevy.z));
    UnitQuaternion::from_quaternion(Quaternion::from_parts(bevy.w as f64, axis))
}

// --- Full poses ---

pub fn enu_iso_to_bevy_transform(enu_pose: &Isometry3<f64>) -> BevyTransform {
    BevyTransform {
        translation: enu_vector_to_bevy_vector(&enu_pose.translation.vector),
        rotation: enu_quat_to_bevy_quat(&enu_pose.rotation),
        scale: BevyVec3::ONE,
    }
}

pub fn bevy_transform_to_enu_iso(transform: &BevyTransform) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(bevy_vector_to_enu_vector(&transform.translation)),
        bevy_quat_to_enu_quat(&transform.rotation),
    )
}

pub fn bevy_global_transform_to_enu_iso(transform: &GlobalTransform) -> Isometry3<f64> {
    bevy_transform_to_enu_iso(&transform.compute_transform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2 as FRAC_PI_2_F32;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const F64_EPSILON: f64 = 1e-6;
    const F32_EPSILON: f32 = 1e-5;

    fn assert_bevy_vec3_approx_eq(actual: BevyVec3, expected: BevyVec3) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(actual.z, expected.z, epsilon = F32_EPSILON);
    }

    fn assert_enu_vec_approx_eq(actual: &Vector3<f64>, expected: &Vector3<f64>) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(actual.z, expected.z, epsilon = F64_EPSILON);
    }

    #[test]
    fn test_enu_axes_map_to_bevy_axes() {
        assert_bevy_vec3_approx_eq(enu_vector_to_bevy_vector(&Vector3::x()), BevyVec3::X);
        assert_bevy_vec3_approx_eq(enu_vector_to_bevy_vector(&Vector3::y()), -BevyVec3::Z);
        assert_bevy_vec3_approx_eq(enu_vector_to_bevy_vector(&Vector3::z()), BevyVec3::Y);
    }

    #[test]
    fn test_points_round_trip() {
        let enu = Point3::new(12.0, -3.5, 40.0);
        let bevy = enu_point_to_bevy_point(&enu);
        assert_bevy_vec3_approx_eq(bevy, BevyVec3::new(12.0, 40.0, 3.5));
        assert_enu_vec_approx_eq(&bevy_point_to_enu_point(&bevy).coords, &enu.coords);
    }

    #[test]
    fn test_enu_yaw_is_bevy_rotation_about_y() {
        let enu_yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let bevy = enu_quat_to_bevy_quat(&enu_yaw);
        let expected = BevyQuat::from_rotation_y(FRAC_PI_2_F32);
        assert!(bevy.dot(expected).abs() > 1.0 - F32_EPSILON);

        // Facing east then yawing left should face north, which is Bevy -Z.
        assert_bevy_vec3_approx_eq(bevy * BevyVec3::X, -BevyVec3::Z);
    }

    #[test]
    fn test_rotations_agree_on_rotated_vectors() {
        let enu_rot = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        let bevy_rot = enu_quat_to_bevy_quat(&enu_rot);
        let v = Vector3::new(0.4, -1.2, 2.0);

        let rotated_in_enu = enu_vector_to_bevy_vector(&(enu_rot * v));
        let rotated_in_bevy = bevy_rot * enu_vector_to_bevy_vector(&v);
        assert_bevy_vec3_approx_eq(rotated_in_bevy, rotated_in_enu);

        let back = bevy_quat_to_enu_quat(&bevy_rot);
        assert_abs_diff_eq!(back.angle_to(&enu_rot), 0.0, epsilon = F64_EPSILON);
    }

    #[test]
    fn test_pose_round_trip_through_bevy_transform() {
        let enu_pose = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
        );
        let transform = enu_iso_to_bevy_transform(&enu_pose);
        assert_bevy_vec3_approx_eq(transform.translation, BevyVec3::new(1.0, 0.5, -2.0));

        let back = bevy_transform_to_enu_iso(&transform);
        assert_enu_vec_approx_eq(&back.translation.vector, &enu_pose.translation.vector);
        assert_abs_diff_eq!(back.rotation.angle_to(&enu_pose.rotation), 0.0, epsilon = F64_EPSILON);
    }
}
