//! Single-flight execution of projections on a background worker.
//!
//! An [`ExecutionContext`] owns the in-progress flag. While a run is in
//! flight any further request is dropped, not queued. The flag is released by
//! the worker itself when the run ends, however it ends.

mod channel;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use tracing::{debug, error};

pub use channel::{progress_channel, ChannelSink, ProgressInbox};

use crate::{
    errors::ProjectionError,
    projection::{Projection, ProjectionEngine, ProjectionRequest, ProgressSink},
};

/// Owns the single-flight flag and the engine used for each run.
#[derive(Clone)]
pub struct ExecutionContext {
    engine: Arc<ProjectionEngine>,
    in_progress: Arc<AtomicBool>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(ProjectionEngine::default())
    }
}

impl ExecutionContext {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Starts a run on a background thread.
    ///
    /// Returns `None` without doing anything when another run is in flight.
    pub fn submit<S>(&self, request: ProjectionRequest, mut sink: S) -> Option<ProjectionHandle>
    where
        S: ProgressSink + 'static,
    {
        let flight = self.acquire()?;
        let engine = Arc::clone(&self.engine);
        let snapshot = Arc::new(request);
        let spawned = thread::Builder::new()
            .name("projection-worker".into())
            .spawn(move || {
                let _flight = flight;
                engine.project(&snapshot, &mut sink)
            });
        match spawned {
            Ok(worker) => Some(ProjectionHandle { worker }),
            Err(err) => {
                // The closure, and with it the flight guard, was dropped.
                error!("could not spawn projection worker: {err}");
                None
            }
        }
    }

    /// Runs on the calling thread under the same single-flight rule.
    pub fn run_blocking(
        &self,
        request: &ProjectionRequest,
        sink: &mut dyn ProgressSink,
    ) -> Option<Result<Projection, ProjectionError>> {
        let _flight = self.acquire()?;
        Some(self.engine.project(request, sink))
    }

    fn acquire(&self) -> Option<FlightGuard> {
        match self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(FlightGuard {
                flag: Arc::clone(&self.in_progress),
            }),
            Err(_) => {
                debug!("projection already running; request dropped");
                None
            }
        }
    }
}

/// Clears the in-progress flag when dropped, including during unwinding.
struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Completion signal for a submitted run.
#[derive(Debug)]
pub struct ProjectionHandle {
    worker: JoinHandle<Result<Projection, ProjectionError>>,
}

impl ProjectionHandle {
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Returns the result if the worker is done, or the handle back if not.
    pub fn try_finish(self) -> Result<Result<Projection, ProjectionError>, ProjectionHandle> {
        if self.is_finished() {
            Ok(self.wait())
        } else {
            Err(self)
        }
    }

    /// Blocks until the worker finishes.
    pub fn wait(self) -> Result<Projection, ProjectionError> {
        self.worker
            .join()
            .unwrap_or(Err(ProjectionError::WorkerPanicked))
    }
}
