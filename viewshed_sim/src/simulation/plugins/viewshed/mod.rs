// viewshed_sim/src/simulation/plugins/viewshed/mod.rs

//! Hosts one `ViewshedAnalyzer` per observer entity and drives it from the
//! frame loop.

pub mod tracer;

use avian3d::prelude::*;

use crate::prelude::*;
use crate::simulation::config::{ObserverConfig, ScenarioConfig};
use crate::simulation::core::simulation_setup::CompletedObservers;
use crate::simulation::core::transforms::bevy_global_transform_to_enu_iso;
use tracer::SpatialQueryTracer;

/// Radius of the small static body marking an observer's base.
const OBSERVER_MARKER_RADIUS: f32 = 0.5;

// =========================================================================
// == Components & Plugin ==
// =========================================================================

#[derive(Component, Debug)]
pub struct ViewshedObserver {
    pub name: String,
    pub observer_height: f64,
    /// Start one run on entering `Running` when auto-update is off.
    pub start_immediately: bool,
    pub analyzer: ViewshedAnalyzer,
}

pub struct ViewshedPlugin;

impl Plugin for ViewshedPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_observers.in_set(SceneBuildSet::Observers),
        )
        .add_systems(OnEnter(AppState::Running), start_manual_observers)
        .add_systems(
            Update,
            (
                (handle_viewshed_commands, viewshed_analysis_system)
                    .chain()
                    .in_set(SimulationSet::Analysis),
                report_completed_viewsheds.in_set(SimulationSet::Reporting),
            ),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_observers(mut commands: Commands, config: Res<ScenarioConfig>) {
    for observer in &config.observers {
        let entity = commands
            .spawn((
                Name::new(observer.name.clone()),
                observer.pose.to_bevy_transform(),
                RigidBody::Static,
                Collider::sphere(OBSERVER_MARKER_RADIUS),
            ))
            .id();

        let analyzer = build_analyzer(observer).with_ignored(HitIdentity::from_entity(entity));
        info!(
            "  -> Spawning observer '{}' ({} traces per run, {} per tick)",
            observer.name,
            LatticeDimensions::from_config(analyzer.config()).total_samples(),
            analyzer.scheduler_config().max_traces_per_tick
        );

        commands.entity(entity).insert(ViewshedObserver {
            name: observer.name.clone(),
            observer_height: observer.observer_height,
            start_immediately: observer.start_immediately,
            analyzer,
        });
    }
}

fn build_analyzer(observer: &ObserverConfig) -> ViewshedAnalyzer {
    let pose = ObserverPose::from_isometry(&observer.pose.to_isometry(), observer.observer_height);
    ViewshedAnalyzer::new(observer.viewshed, observer.scheduler, pose)
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

/// Applies one host control to an analyzer. Returns whether a run was started.
pub fn apply_viewshed_action(analyzer: &mut ViewshedAnalyzer, action: ViewshedAction) -> bool {
    match action {
        ViewshedAction::Start => analyzer.start_analysis(),
        ViewshedAction::Stop => {
            analyzer.stop_analysis();
            false
        }
        ViewshedAction::Clear => {
            analyzer.clear_results();
            false
        }
    }
}

/// Queues a start for every manual-mode observer that asked for one.
fn start_manual_observers(
    observers: Query<(Entity, &ViewshedObserver)>,
    mut command_writer: EventWriter<ViewshedCommand>,
) {
    for (entity, observer) in &observers {
        if observer.start_immediately && !observer.analyzer.scheduler_config().auto_update {
            command_writer.write(ViewshedCommand {
                observer: entity,
                action: ViewshedAction::Start,
            });
        }
    }
}

fn handle_viewshed_commands(
    mut command_reader: EventReader<ViewshedCommand>,
    mut observers: Query<(&GlobalTransform, &mut ViewshedObserver)>,
) {
    for command in command_reader.read() {
        let Ok((transform, mut observer)) = observers.get_mut(command.observer) else {
            warn!(
                "Ignoring {:?} for {:?}: not a viewshed observer",
                command.action, command.observer
            );
            continue;
        };

        // A start must use where the observer is now.
        let pose = ObserverPose::from_isometry(
            &bevy_global_transform_to_enu_iso(transform),
            observer.observer_height,
        );
        observer.analyzer.set_pose(pose);

        let started = apply_viewshed_action(&mut observer.analyzer, command.action);
        debug!(
            "[{}] {:?} command applied (started: {})",
            observer.name, command.action, started
        );
    }
}

/// Refreshes every observer's pose and spends its trace budget for this frame.
fn viewshed_analysis_system(
    time: Res<Time>,
    spatial_query: SpatialQuery,
    mut observers: Query<(Entity, &GlobalTransform, &mut ViewshedObserver)>,
    mut completed_writer: EventWriter<ViewshedCompleted>,
) {
    let tracer = SpatialQueryTracer::new(&spatial_query);
    let dt = time.delta_secs_f64();

    for (entity, transform, mut observer) in &mut observers {
        let pose = ObserverPose::from_isometry(
            &bevy_global_transform_to_enu_iso(transform),
            observer.observer_height,
        );
        observer.analyzer.set_pose(pose);

        let report = observer.analyzer.tick(dt, &tracer);
        if report.started {
            debug!(
                "[{}] Analysis started: {} traces",
                observer.name,
                observer.analyzer.lattice().len()
            );
        }
        if report.completed {
            completed_writer.write(ViewshedCompleted {
                observer: entity,
                name: observer.name.clone(),
                run: observer.analyzer.completed_runs(),
                summary: observer.analyzer.summary(),
                results: observer.analyzer.results().to_vec(),
            });
        }
    }
}

fn report_completed_viewsheds(
    mut events: EventReader<ViewshedCompleted>,
    observers: Query<(&GlobalTransform, &ViewshedObserver)>,
    mut completed: ResMut<CompletedObservers>,
) {
    for event in events.read() {
        let summary = &event.summary;
        info!(
            "[{}] Run {} complete: {}/{} visible ({:.1}%)",
            event.name, event.run, summary.visible, summary.total, summary.percentage
        );

        if let Ok((transform, observer)) = observers.get(event.observer) {
            log_band_breakdown(observer, &event.results);

            let location = ObserverPose::from_isometry(
                &bevy_global_transform_to_enu_iso(transform),
                observer.observer_height,
            )
            .observer_location();
            if let Some(nearest) = find_nearest_visible(&event.results, &location) {
                debug!(
                    "[{}] Nearest visible sample at {:.1} m: {:?}",
                    event.name, nearest.distance, nearest.world_position
                );
            }
        }

        completed.0.insert(event.observer);
    }
}

/// Logs the visible share of each distance band.
fn log_band_breakdown(observer: &ViewshedObserver, results: &[ViewshedPoint]) {
    let config = observer.analyzer.config();
    let steps = config.distance_steps.max(1);
    let band_width = config.max_distance / steps as f64;

    for band in 0..steps {
        // Every sample of a band sits exactly at the band's distance.
        let distance = band_width * (band + 1) as f64;
        let in_band = filter_by_distance(
            results,
            distance - band_width / 2.0,
            distance + band_width / 2.0,
        );
        debug!(
            "[{}]   {:>8.1} m: {:>5.1}% of {} samples visible",
            observer.name,
            distance,
            visibility_percentage(&in_band),
            in_band.len()
        );
    }
}
