// viewshed_core/src/analyzer.rs

//! The incremental trace scheduler.
//!
//! A run generates the whole lattice up front, then spends a bounded number of
//! traces per tick until the queue is drained. Nothing here runs in the
//! background; the host decides when to tick.

use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::aggregate::{self, VisibilitySummary};
use crate::config::{SchedulerConfig, ViewshedConfig};
use crate::lattice::{generate_lattice, Lattice, LatticeDimensions};
use crate::trace::{classify_trace, TraceVisibility, ViewshedPoint};
use crate::types::{HitIdentity, ObserverPose};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    InProgress,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Traces executed during this tick.
    pub processed: usize,
    /// A new run was started by the auto-update timer.
    pub started: bool,
    /// The run finished during this tick. Set exactly once per run.
    pub completed: bool,
}

/// Invoked once per completed run with the full result snapshot.
pub type CompletionCallback = Box<dyn FnMut(&[ViewshedPoint]) + Send + Sync>;

pub struct ViewshedAnalyzer {
    config: ViewshedConfig,
    scheduler: SchedulerConfig,
    pose: ObserverPose,
    /// Identity of the observer's own host, skipped by every trace.
    ignore: Option<HitIdentity>,

    state: RunState,
    cursor: usize,
    lattice: Lattice,
    results: Vec<ViewshedPoint>,

    completed_runs: u64,
    /// Seconds since auto-update last fired. `None` until the first tick.
    since_last_update: Option<f64>,
    on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for ViewshedAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewshedAnalyzer")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("pose", &self.pose)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("queued", &self.lattice.len())
            .field("completed_runs", &self.completed_runs)
            .finish_non_exhaustive()
    }
}

impl ViewshedAnalyzer {
    /// Creates an idle analyzer. Both configs are clamped to their safe ranges.
    pub fn new(config: ViewshedConfig, scheduler: SchedulerConfig, pose: ObserverPose) -> Self {
        Self {
            config: config.sanitized(),
            scheduler: scheduler.sanitized(),
            pose,
            ignore: None,
            state: RunState::Idle,
            cursor: 0,
            lattice: Lattice::default(),
            results: Vec::new(),
            completed_runs: 0,
            since_last_update: None,
            on_complete: None,
        }
    }

    /// Sets the identity every trace should ignore (usually the host itself).
    pub fn with_ignored(mut self, identity: HitIdentity) -> Self {
        self.ignore = Some(identity);
        self
    }

    pub fn set_completion_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&[ViewshedPoint]) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    // --- Configuration & pose ---

    pub fn config(&self) -> &ViewshedConfig {
        &self.config
    }

    /// Takes effect at the next `start_analysis`.
    pub fn set_config(&mut self, config: ViewshedConfig) {
        self.config = config.sanitized();
    }

    pub fn scheduler_config(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    pub fn set_scheduler_config(&mut self, scheduler: SchedulerConfig) {
        self.scheduler = scheduler.sanitized();
    }

    pub fn pose(&self) -> &ObserverPose {
        &self.pose
    }

    /// Takes effect at the next `start_analysis`; a run in progress keeps the
    /// lattice it was started with.
    pub fn set_pose(&mut self, pose: ObserverPose) {
        self.pose = pose;
    }

    pub fn ignored(&self) -> Option<HitIdentity> {
        self.ignore
    }

    // --- Run state ---

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == RunState::InProgress
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fraction of the current queue already traced, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.lattice.is_empty() {
            0.0
        } else {
            self.cursor as f64 / self.lattice.len() as f64
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn dimensions(&self) -> &LatticeDimensions {
        self.lattice.dimensions()
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    // --- Results ---

    /// The results buffer, parallel to the trace queue. Entries past the cursor
    /// still hold their pending placeholder while a run is in progress.
    pub fn results(&self) -> &[ViewshedPoint] {
        &self.results
    }

    pub fn visible_count(&self) -> usize {
        aggregate::count_visible(&self.results)
    }

    pub fn hidden_count(&self) -> usize {
        aggregate::count_hidden(&self.results)
    }

    pub fn visibility_percentage(&self) -> f64 {
        aggregate::visibility_percentage(&self.results)
    }

    pub fn summary(&self) -> VisibilitySummary {
        aggregate::summarize(&self.results)
    }

    // --- Control ---

    /// Starts a new run. Returns `false` (and does nothing) while a run is
    /// already in progress, and also when the generated lattice is empty.
    pub fn start_analysis(&mut self) -> bool {
        if self.is_in_progress() {
            return false;
        }

        self.clear_results();
        self.lattice = generate_lattice(&self.pose, &self.config);

        let origin = self.pose.observer_location();
        self.results = self
            .lattice
            .points()
            .iter()
            .map(|point| ViewshedPoint::pending(&origin, &point.trace_end))
            .collect();

        if self.results.is_empty() {
            warn!("Viewshed lattice is empty; nothing to analyze.");
            return false;
        }

        self.state = RunState::InProgress;
        self.cursor = 0;
        debug!(
            "Viewshed analysis started: {} traces from {:?}",
            self.lattice.len(),
            origin
        );
        true
    }

    /// Abandons the current run. Results traced so far are kept as they are.
    pub fn stop_analysis(&mut self) {
        if self.is_in_progress() {
            debug!(
                "Viewshed analysis stopped at {}/{}",
                self.cursor,
                self.lattice.len()
            );
        }
        self.state = RunState::Idle;
        self.cursor = 0;
    }

    /// Drops the queue, the results and the lattice dimensions, whatever the state.
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.lattice = Lattice::default();
        self.state = RunState::Idle;
        self.cursor = 0;
    }

    /// Advances the analyzer by one host frame.
    ///
    /// With auto-update on, `delta_secs` feeds the update timer and a run is
    /// started whenever the interval elapses while idle (the very first tick
    /// counts as elapsed). Then up to `max_traces_per_tick` traces are executed.
    pub fn tick(&mut self, delta_secs: f64, tracer: &dyn TraceVisibility) -> TickReport {
        let mut started = false;

        if self.scheduler.auto_update {
            let elapsed = match self.since_last_update {
                Some(elapsed) => elapsed + delta_secs.max(0.0),
                None => f64::INFINITY,
            };
            if elapsed >= self.scheduler.update_interval_secs {
                if !self.is_in_progress() {
                    started = self.start_analysis();
                }
                self.since_last_update = Some(0.0);
            } else {
                self.since_last_update = Some(elapsed);
            }
        }

        let budget = self.scheduler.max_traces_per_tick as usize;
        TickReport {
            started,
            ..self.process_budget(budget, tracer)
        }
    }

    /// Executes up to `budget` traces from the cursor. Does nothing when idle.
    pub fn process_budget(&mut self, budget: usize, tracer: &dyn TraceVisibility) -> TickReport {
        if !self.is_in_progress() {
            return TickReport::default();
        }

        let end = self.cursor.saturating_add(budget).min(self.lattice.len());
        let mut processed = 0;
        while self.cursor < end {
            self.process_one_trace(self.cursor, tracer);
            self.cursor += 1;
            processed += 1;
        }

        let completed = self.cursor >= self.lattice.len();
        if completed {
            self.finish_run();
        }

        TickReport {
            processed,
            started: false,
            completed,
        }
    }

    fn process_one_trace(&mut self, index: usize, tracer: &dyn TraceVisibility) {
        let (Some(point), Some(result)) =
            (self.lattice.points().get(index), self.results.get_mut(index))
        else {
            return;
        };

        let hit = tracer.trace(&point.trace_start, &point.trace_end, self.ignore);
        let classification = classify_trace(point, hit);
        trace!(
            "Trace {} (band {}, h {}, v {}): {:?}",
            index,
            point.distance_band_index,
            point.horizontal_index,
            point.vertical_index,
            classification
        );
        result.apply(point, classification);
    }

    fn finish_run(&mut self) {
        self.state = RunState::Idle;
        self.completed_runs += 1;

        let summary = self.summary();
        info!(
            "Viewshed analysis complete: {} visible, {} hidden ({:.1}%)",
            summary.visible, summary.hidden, summary.percentage
        );

        if let Some(callback) = self.on_complete.as_mut() {
            callback(&self.results);
        }
    }
}
