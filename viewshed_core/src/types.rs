// viewshed_core/src/types.rs

use nalgebra::{Isometry3, Point3, Unit, UnitVector3, Vector3};

use crate::error::ViewshedError;

// --- Core Identifier ---
/// An opaque token naming whatever a trace struck (or the observer's own host).
/// The core never interprets it; it is only carried through as hit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HitIdentity(pub u64);

impl HitIdentity {
    // A convenience method for use in the Bevy adapter crate.
    #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
    pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
        Self(entity.to_bits())
    }

    #[cfg(feature = "bevy")]
    pub fn to_entity(self) -> bevy_ecs::prelude::Entity {
        bevy_ecs::prelude::Entity::from_bits(self.0)
    }
}

/// Squared length below which a direction is treated as zero.
const MIN_DIRECTION_NORM_SQUARED: f64 = 1e-12;

/// Where the observer stands and where it is looking.
///
/// The frame is right-handed and Z-up. The analysis origin is lifted
/// `observer_height` units above `position` along world +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPose {
    position: Point3<f64>,
    forward: UnitVector3<f64>,
    up_reference: UnitVector3<f64>,
    observer_height: f64,
}

impl ObserverPose {
    /// Builds a pose from a position, a facing direction and an up reference.
    ///
    /// Neither vector has to be normalized, but both must be finite and non-zero,
    /// and `up_reference` must not be parallel to `forward`.
    pub fn new(
        position: Point3<f64>,
        forward: Vector3<f64>,
        up_reference: Vector3<f64>,
        observer_height: f64,
    ) -> Result<Self, ViewshedError> {
        let finite = position.coords.iter().all(|c| c.is_finite())
            && forward.iter().all(|c| c.is_finite())
            && up_reference.iter().all(|c| c.is_finite())
            && observer_height.is_finite();
        if !finite {
            return Err(ViewshedError::NonFinitePose);
        }
        if forward.norm_squared() < MIN_DIRECTION_NORM_SQUARED {
            return Err(ViewshedError::ZeroForward);
        }
        if forward.cross(&up_reference).norm_squared() < MIN_DIRECTION_NORM_SQUARED {
            return Err(ViewshedError::DegenerateUp);
        }

        Ok(Self {
            position,
            forward: Unit::new_normalize(forward),
            up_reference: Unit::new_normalize(up_reference),
            observer_height,
        })
    }

    /// Builds a pose from a rigid transform. Local +X is forward and local +Z is up,
    /// so this can never produce a degenerate basis.
    pub fn from_isometry(isometry: &Isometry3<f64>, observer_height: f64) -> Self {
        let rotation = isometry.rotation;
        Self {
            position: Point3::from(isometry.translation.vector),
            forward: Unit::new_normalize(rotation * Vector3::x()),
            up_reference: Unit::new_normalize(rotation * Vector3::z()),
            observer_height,
        }
    }

    /// An observer at `position` facing world +X with world +Z up.
    pub fn looking_along_x(position: Point3<f64>, observer_height: f64) -> Self {
        Self {
            position,
            forward: Vector3::x_axis(),
            up_reference: Vector3::z_axis(),
            observer_height,
        }
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn forward(&self) -> UnitVector3<f64> {
        self.forward
    }

    pub fn up_reference(&self) -> UnitVector3<f64> {
        self.up_reference
    }

    pub fn observer_height(&self) -> f64 {
        self.observer_height
    }

    /// The point every trace starts from: `position + (0, 0, observer_height)`.
    pub fn observer_location(&self) -> Point3<f64> {
        self.position + Vector3::new(0.0, 0.0, self.observer_height)
    }
}

impl Default for ObserverPose {
    fn default() -> Self {
        Self::looking_along_x(Point3::origin(), 0.0)
    }
}
