// viewshed_sim/src/simulation/config/mod.rs

//! Loading and validating scenario files.

mod error;
pub mod structs;

use std::collections::HashSet;
use std::path::Path;

use bevy::log::info;
use figment::{
    providers::{Format, Toml},
    Figment,
};

pub use error::ConfigError;
pub use structs::{ObserverConfig, Pose, ScenarioConfig, SimulationSection, WorldConfig};

/// Reads, parses and validates the scenario at `path`.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());

    let config: ScenarioConfig = Figment::new().merge(Toml::file(path)).extract()?;
    config.validate()?;
    Ok(config)
}

/// Parses and validates a scenario held in memory.
pub fn parse_scenario(toml: &str) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig = Figment::new().merge(Toml::string(toml)).extract()?;
    config.validate()?;
    Ok(config)
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.observers.is_empty() {
            return Err(ConfigError::NoObservers);
        }

        let mut names = HashSet::new();
        for observer in &self.observers {
            if !names.insert(observer.name.as_str()) {
                return Err(ConfigError::DuplicateObserver(observer.name.clone()));
            }
        }

        let world = &self.world;
        for (name, value) in [
            ("ground_extent", world.ground_extent),
            ("spawn_radius", world.spawn_radius),
            ("keep_out_radius", world.keep_out_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWorldValue { name, value });
            }
        }

        let (min, max) = (world.occluder_size_min, world.occluder_size_max);
        let sizes_ok = min
            .iter()
            .zip(max.iter())
            .all(|(lo, hi)| lo.is_finite() && hi.is_finite() && *lo > 0.0 && lo <= hi);
        if !sizes_ok {
            return Err(ConfigError::InvalidOccluderSize { min, max });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    const WATCHTOWER: &str = r#"
        [simulation]
        seed = 42
        max_frames = 600

        [world]
        ground_extent = 800.0
        occluder_count = 10
        spawn_radius = 300.0
        keep_out_radius = 15.0
        occluder_size_min = [2.0, 2.0, 2.0]
        occluder_size_max = [10.0, 10.0, 12.0]

        [[observers]]
        name = "north_tower"
        observer_height = 12.0
        pose = { translation = [0.0, 50.0, 0.0], rotation = [0.0, 0.0, 90.0] }

        [observers.viewshed]
        max_distance = 400.0
        distance_steps = 4

        [observers.scheduler]
        max_traces_per_tick = 200
        auto_update = false

        [[observers]]
        name = "gate"
    "#;

    #[test]
    fn test_parse_full_scenario() {
        let config = parse_scenario(WATCHTOWER).unwrap();
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.max_frames, Some(600));
        assert!(config.simulation.exit_on_complete);
        assert_eq!(config.world.occluder_count, 10);
        assert_eq!(config.observers.len(), 2);

        let tower = &config.observers[0];
        assert_eq!(tower.name, "north_tower");
        assert_eq!(tower.observer_height, 12.0);
        assert_eq!(tower.pose.translation, Vector3::new(0.0, 50.0, 0.0));
        assert_abs_diff_eq!(
            tower.pose.rotation.euler_angles().2,
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
        assert_eq!(tower.viewshed.max_distance, 400.0);
        assert_eq!(tower.viewshed.distance_steps, 4);
        // Unspecified lattice fields fall back to their defaults.
        assert_eq!(tower.viewshed.horizontal_fov_deg, 90.0);
        assert_eq!(tower.scheduler.max_traces_per_tick, 200);
        assert!(!tower.scheduler.auto_update);
        assert!(tower.start_immediately);

        let gate = &config.observers[1];
        assert_eq!(gate.observer_height, 1.5);
        assert_eq!(gate.scheduler.max_traces_per_tick, 50);
    }

    #[test]
    fn test_scenario_without_observers_is_rejected() {
        let err = parse_scenario("[simulation]\nseed = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoObservers));
    }

    #[test]
    fn test_duplicate_observer_names_are_rejected() {
        let toml = r#"
            [[observers]]
            name = "a"
            [[observers]]
            name = "a"
        "#;
        let err = parse_scenario(toml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateObserver(name) if name == "a"));
    }

    #[test]
    fn test_inverted_occluder_sizes_are_rejected() {
        let toml = r#"
            [world]
            ground_extent = 100.0
            occluder_count = 1
            spawn_radius = 10.0
            keep_out_radius = 0.0
            occluder_size_min = [5.0, 5.0, 5.0]
            occluder_size_max = [1.0, 5.0, 5.0]
            [[observers]]
            name = "a"
        "#;
        let err = parse_scenario(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOccluderSize { .. }));
    }

    #[test]
    fn test_unknown_fields_are_parse_errors() {
        let toml = r#"
            [[observers]]
            name = "a"
            [observers.viewshed]
            max_distanse = 10.0
        "#;
        assert!(matches!(parse_scenario(toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_scenario(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
