// viewshed_sim/src/simulation/config/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] figment::Error),

    #[error("scenario defines no observers")]
    NoObservers,

    #[error("duplicate observer name '{0}'")]
    DuplicateObserver(String),

    #[error("occluder size range is invalid: min {min:?}, max {max:?}")]
    InvalidOccluderSize { min: [f64; 3], max: [f64; 3] },

    #[error("world setting '{name}' must be finite and non-negative, got {value}")]
    InvalidWorldValue { name: &'static str, value: f64 },
}
