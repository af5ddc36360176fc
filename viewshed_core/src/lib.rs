// viewshed_core/src/lib.rs

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod lattice;
pub mod prelude;
pub mod trace;
pub mod types;
