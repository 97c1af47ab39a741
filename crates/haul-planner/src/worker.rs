//! Background planner handle.
//!
//! [`HaulPlanner`] runs a [`RoutePlanner`] on its own thread and exposes the
//! `Idle → Running → Stopping → Idle` life cycle to the caller.  The worker
//! owns its grid snapshot; the caller sees routes only through
//! [`PlannerEvent`]s and the progress counters, and gets the simulated grid
//! back from [`HaulPlanner::join`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use haul_grid::{GridGraph, RegionSet};

use crate::{
    HaulRoute, PlanObserver, PlanSummary, PlannerConfig, PlannerError, PlannerResult, RoutePlanner,
};

// ── State & events ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlannerState {
    Idle,
    Running,
    /// Cancellation requested; the loop has not yet noticed.
    Stopping,
}

/// Lifecycle notifications of one run, in order: `Started`, any number of
/// `RouteApplied`, then exactly one of `Finished` / `Failed`.
#[derive(Clone, Debug)]
pub enum PlannerEvent {
    Started { entries: usize },
    RouteApplied(HaulRoute),
    Finished(PlanSummary),
    Failed(String),
}

/// Result of [`HaulPlanner::stop`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The loop acknowledged the request and the planner is idle.
    Stopped,
    /// Nothing was running.
    AlreadyIdle,
    /// The timeout elapsed first; the loop is still winding down.
    TimedOut,
}

/// Snapshot of a run in progress.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Progress {
    pub routes_applied: u64,
    pub cut_m3:         f64,
    pub fill_m3:        f64,
}

/// What the worker hands back when joined.
#[derive(Clone, Debug)]
pub struct FinishedPlan {
    pub grid:    GridGraph,
    pub summary: PlanSummary,
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct Shared {
    state:    Mutex<PlannerState>,
    changed:  Condvar,
    cancel:   AtomicBool,
    progress: Mutex<Progress>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PlannerState) {
        *self.state() = state;
        self.changed.notify_all();
    }

    fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Forwards loop callbacks to the event channel and the progress counters.
struct EventForwarder {
    shared: Arc<Shared>,
    events: Sender<PlannerEvent>,
}

impl PlanObserver for EventForwarder {
    fn on_plan_start(&mut self, grid: &GridGraph) {
        let _ = self.events.send(PlannerEvent::Started { entries: grid.len() });
    }

    fn on_route_applied(&mut self, route: &HaulRoute, _grid: &GridGraph) {
        {
            let mut p = self.shared.progress();
            p.routes_applied += 1;
            p.cut_m3 += route.cut.volume_m3;
            p.fill_m3 += route.fill.volume_m3;
        }
        // A dropped receiver only means nobody is listening.
        let _ = self.events.send(PlannerEvent::RouteApplied(route.clone()));
    }

    fn on_plan_end(&mut self, summary: &PlanSummary) {
        let _ = self.events.send(PlannerEvent::Finished(*summary));
    }
}

// ── HaulPlanner ───────────────────────────────────────────────────────────────

/// Handle to at most one background planning loop.
pub struct HaulPlanner {
    shared:       Arc<Shared>,
    worker:       Option<JoinHandle<PlannerResult<FinishedPlan>>>,
    stop_timeout: Duration,
}

impl HaulPlanner {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state:    Mutex::new(PlannerState::Idle),
                changed:  Condvar::new(),
                cancel:   AtomicBool::new(false),
                progress: Mutex::new(Progress::default()),
            }),
            worker:       None,
            stop_timeout: PlannerConfig::default().stop_timeout(),
        }
    }

    pub fn state(&self) -> PlannerState {
        *self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() != PlannerState::Idle
    }

    pub fn progress(&self) -> Progress {
        *self.shared.progress()
    }

    /// Start planning on `grid` (the caller's private snapshot) and return
    /// the run's event stream.
    ///
    /// A run already in progress is stopped and joined first, so only one
    /// loop is ever active per handle; its final result is discarded.
    ///
    /// # Errors
    ///
    /// [`PlannerError::Config`] for an invalid configuration (nothing is
    /// started), [`PlannerError::Spawn`] if the thread cannot be created.
    pub fn start(
        &mut self,
        grid:    GridGraph,
        regions: RegionSet,
        config:  PlannerConfig,
    ) -> PlannerResult<Receiver<PlannerEvent>> {
        if self.worker.is_some() {
            self.stop();
            let _ = self.join();
        }

        self.stop_timeout = config.stop_timeout();
        let mut planner = RoutePlanner::new(grid, regions, config)?;

        let (tx, rx) = mpsc::channel();
        self.shared.cancel.store(false, Ordering::Release);
        *self.shared.progress() = Progress::default();
        self.shared.set_state(PlannerState::Running);

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("haul-planner".into())
            .spawn(move || {
                let mut forwarder = EventForwarder {
                    shared: Arc::clone(&shared),
                    events: tx.clone(),
                };
                let result = planner.run(&mut forwarder, &shared.cancel);
                if let Err(e) = &result {
                    let _ = tx.send(PlannerEvent::Failed(e.to_string()));
                }
                shared.set_state(PlannerState::Idle);
                result.map(|summary| FinishedPlan { grid: planner.into_grid(), summary })
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(rx)
            }
            Err(e) => {
                self.shared.set_state(PlannerState::Idle);
                Err(PlannerError::Spawn(e))
            }
        }
    }

    /// Request cancellation and wait, at most the configured stop timeout,
    /// for the loop to go idle.
    pub fn stop(&self) -> StopOutcome {
        let mut state = self.shared.state();
        if *state == PlannerState::Idle {
            return StopOutcome::AlreadyIdle;
        }
        *state = PlannerState::Stopping;
        self.shared.cancel.store(true, Ordering::Release);

        let (state, wait) = self
            .shared
            .changed
            .wait_timeout_while(state, self.stop_timeout, |s| *s != PlannerState::Idle)
            .unwrap_or_else(PoisonError::into_inner);
        drop(state);

        if wait.timed_out() {
            let timeout_ms = self.stop_timeout.as_millis() as u64;
            warn!(timeout_ms, "planner did not stop in time");
            StopOutcome::TimedOut
        } else {
            StopOutcome::Stopped
        }
    }

    /// Block until the current run ends and take its result.  `None` when
    /// no run was started since the last join.
    pub fn join(&mut self) -> Option<PlannerResult<FinishedPlan>> {
        let handle = self.worker.take()?;
        let result = handle.join().unwrap_or(Err(PlannerError::WorkerPanicked));
        // A panicked worker never reset the state itself.
        self.shared.set_state(PlannerState::Idle);
        Some(result)
    }
}

impl Default for HaulPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HaulPlanner {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shared.cancel.store(true, Ordering::Release);
            let _ = self.join();
        }
    }
}
