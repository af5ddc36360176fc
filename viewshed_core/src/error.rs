// viewshed_core/src/error.rs

use thiserror::Error;

/// Errors raised by the core library.
///
/// Configuration is never rejected (it is clamped instead), so the only
/// failures left are observer poses that cannot produce a view basis.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ViewshedError {
    #[error("observer pose contains a non-finite component")]
    NonFinitePose,
    #[error("observer forward vector has zero length")]
    ZeroForward,
    #[error("observer up reference is zero or parallel to the forward vector")]
    DegenerateUp,
}
