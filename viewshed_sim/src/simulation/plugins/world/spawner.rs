// viewshed_sim/src/simulation/plugins/world/spawner.rs

//! Builds the static scene the observers look at: a ground slab and a field
//! of box occluders scattered with the simulation RNG.

use avian3d::prelude::*;
use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::prelude::*;
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::transforms::{enu_point_to_bevy_point, enu_vector_to_bevy_vector};

/// Thickness of the ground slab. Its top face sits at `z = 0`.
const GROUND_THICKNESS: f64 = 1.0;

/// Placement attempts per occluder before giving up on it.
const MAX_PLACEMENT_ATTEMPTS: u32 = 32;

/// Marker for the scattered occluder boxes.
#[derive(Component, Debug)]
pub struct Occluder;

/// An axis-aligned box in the ENU frame, resting on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccluderBox {
    pub center: Point3<f64>,
    pub size: Vector3<f64>,
}

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (spawn_ground, spawn_occluders).in_set(SceneBuildSet::World),
        );
    }
}

fn spawn_ground(mut commands: Commands, config: Res<ScenarioConfig>) {
    let extent = config.world.ground_extent;
    info!("[SCENE] Spawning {:.0} m ground slab.", extent);

    let center = Point3::new(0.0, 0.0, -GROUND_THICKNESS / 2.0);
    let size = enu_vector_to_bevy_vector(&Vector3::new(extent, extent, GROUND_THICKNESS)).abs();
    commands.spawn((
        Name::new("Ground"),
        RigidBody::Static,
        Collider::cuboid(size.x, size.y, size.z),
        Transform::from_translation(enu_point_to_bevy_point(&center)),
    ));
}

fn spawn_occluders(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut rng: ResMut<SimulationRng>,
) {
    let observers: Vec<Point3<f64>> = config
        .observers
        .iter()
        .map(|observer| Point3::from(observer.pose.translation))
        .collect();

    let boxes = scatter_occluders(&config.world, &observers, &mut rng.0);
    if boxes.len() < config.world.occluder_count as usize {
        warn!(
            "[SCENE] Placed only {}/{} occluders outside the observers' keep-out zones.",
            boxes.len(),
            config.world.occluder_count
        );
    }

    for (index, occluder) in boxes.iter().enumerate() {
        let size = enu_vector_to_bevy_vector(&occluder.size).abs();
        commands.spawn((
            Name::new(format!("Occluder {}", index)),
            Occluder,
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            Transform::from_translation(enu_point_to_bevy_point(&occluder.center)),
        ));
    }
    info!("[SCENE] Spawned {} occluders.", boxes.len());
}

/// Draws occluder boxes uniformly inside the spawn disc, skipping any whose
/// center falls within `keep_out_radius` of an observer (measured on the ground).
pub fn scatter_occluders<R: Rng>(
    world: &WorldConfig,
    observers: &[Point3<f64>],
    rng: &mut R,
) -> Vec<OccluderBox> {
    let mut boxes = Vec::with_capacity(world.occluder_count as usize);

    for _ in 0..world.occluder_count {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            // sqrt keeps the density uniform over the disc's area.
            let radius = world.spawn_radius * rng.gen_range(0.0..=1.0_f64).sqrt();
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let (east, north) = (radius * angle.cos(), radius * angle.sin());

            let blocked = observers.iter().any(|observer| {
                let dx = observer.x - east;
                let dy = observer.y - north;
                (dx * dx + dy * dy).sqrt() < world.keep_out_radius
            });
            if blocked {
                continue;
            }

            let size = Vector3::from_fn(|axis, _| {
                let (lo, hi) = (world.occluder_size_min[axis], world.occluder_size_max[axis]);
                rng.gen_range(lo..=hi)
            });
            boxes.push(OccluderBox {
                center: Point3::new(east, north, size.z / 2.0),
                size,
            });
            break;
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scatter_is_deterministic_per_seed() {
        let world = WorldConfig::default();
        let a = scatter_occluders(&world, &[], &mut ChaCha8Rng::seed_from_u64(11));
        let b = scatter_occluders(&world, &[], &mut ChaCha8Rng::seed_from_u64(11));
        let c = scatter_occluders(&world, &[], &mut ChaCha8Rng::seed_from_u64(12));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), world.occluder_count as usize);
    }

    #[test]
    fn test_scattered_boxes_respect_bounds_and_rest_on_ground() {
        let world = WorldConfig::default();
        let observers = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, -40.0, 0.0)];
        let boxes = scatter_occluders(&world, &observers, &mut ChaCha8Rng::seed_from_u64(3));

        for occluder in &boxes {
            let horizontal = occluder.center.coords.xy().norm();
            assert!(horizontal <= world.spawn_radius + 1e-9);
            for observer in &observers {
                let offset = (occluder.center - observer).xy().norm();
                assert!(offset >= world.keep_out_radius);
            }
            for axis in 0..3 {
                assert!(occluder.size[axis] >= world.occluder_size_min[axis]);
                assert!(occluder.size[axis] <= world.occluder_size_max[axis]);
            }
            assert_eq!(occluder.center.z, occluder.size.z / 2.0);
        }
    }

    #[test]
    fn test_keep_out_covering_the_disc_places_nothing() {
        let world = WorldConfig {
            spawn_radius: 10.0,
            keep_out_radius: 50.0,
            ..Default::default()
        };
        let boxes = scatter_occluders(&world, &[Point3::origin()], &mut ChaCha8Rng::seed_from_u64(1));
        assert!(boxes.is_empty());
    }
}
