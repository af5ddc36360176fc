// viewshed_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::trace::{is_point_visible, TraceHit, TraceVisibility};
pub use crate::types::{HitIdentity, ObserverPose};

// --- Configuration ---
pub use crate::config::{SchedulerConfig, ViewshedConfig};
pub use crate::error::ViewshedError;

// --- Lattice & Results ---
pub use crate::lattice::{generate_lattice, Lattice, LatticeDimensions, TracePoint};
pub use crate::trace::{classify_trace, TraceClassification, ViewshedPoint, HIT_DISTANCE_TOLERANCE};

// --- Scheduling ---
pub use crate::analyzer::{RunState, TickReport, ViewshedAnalyzer};

// --- Aggregate Queries ---
pub use crate::aggregate::{
    count_hidden, count_visible, filter_by_distance, find_nearest_visible, hidden_points,
    summarize, visibility_percentage, visible_points, VisibilitySummary,
};
