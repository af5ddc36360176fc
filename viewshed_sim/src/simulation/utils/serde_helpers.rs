// viewshed_sim/src/simulation/utils/serde_helpers.rs

//! `#[serde(deserialize_with = ...)]` adapters for reading nalgebra types from
//! plain TOML arrays.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Deserializer};

/// `[x, y, z]` -> `Vector3<f64>`.
pub fn vec3_from_array<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let [x, y, z] = <[f64; 3]>::deserialize(deserializer)?;
    Ok(Vector3::new(x, y, z))
}

/// `[roll, pitch, yaw]` in degrees -> `UnitQuaternion<f64>`.
pub fn quat_from_euler_deg<'de, D>(deserializer: D) -> Result<UnitQuaternion<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let [roll, pitch, yaw] = <[f64; 3]>::deserialize(deserializer)?;
    Ok(UnitQuaternion::from_euler_angles(
        roll.to_radians(),
        pitch.to_radians(),
        yaw.to_radians(),
    ))
}
