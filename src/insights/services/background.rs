//! Bounded runner for fire-and-forget background jobs.

use super::error::{InsightsError, InsightsResult};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, oneshot};
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tracing::{Instrument, error, info_span};

/// How a background job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// The job ran to completion.
    Completed,
    /// The job was cancelled or panicked before completing.
    Interrupted,
}

/// Handle to a spawned background job.
///
/// Dropping the handle leaves the job running.
#[derive(Debug)]
pub struct BackgroundHandle {
    abort: AbortHandle,
    done: oneshot::Receiver<()>,
}

impl BackgroundHandle {
    /// Waits for the job to end.
    pub async fn wait(self) -> BackgroundOutcome {
        match self.done.await {
            Ok(()) => BackgroundOutcome::Completed,
            Err(_) => BackgroundOutcome::Interrupted,
        }
    }

    /// Requests cancellation of the job at its next await point.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Returns whether the job has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Runs background jobs with at most a fixed number executing at once.
#[derive(Debug, Clone)]
pub struct BackgroundRunner {
    permits: Arc<Semaphore>,
    jobs: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundRunner {
    /// Creates a runner executing at most `max_concurrent` jobs at once.
    ///
    /// A limit of zero is raised to one.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            jobs: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Spawns `job` on the current runtime.
    ///
    /// The job waits for a free slot before it starts.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Internal`] when the job registry is poisoned.
    pub fn spawn<F>(&self, name: &'static str, job: F) -> InsightsResult<BackgroundHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let (done_tx, done_rx) = oneshot::channel();
        let span = info_span!("background_job", job = name);
        let mut jobs = self.lock_jobs()?;
        while let Some(finished) = jobs.try_join_next() {
            log_join_error(finished);
        }
        let abort = jobs.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                job.await;
                done_tx.send(()).ok();
            }
            .instrument(span),
        );
        Ok(BackgroundHandle {
            abort,
            done: done_rx,
        })
    }

    /// Waits for every spawned job to end.
    ///
    /// Jobs spawned while draining are left to a later drain.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Internal`] when the job registry is poisoned.
    pub async fn drain(&self) -> InsightsResult<()> {
        let mut pending = std::mem::take(&mut *self.lock_jobs()?);
        while let Some(finished) = pending.join_next().await {
            log_join_error(finished);
        }
        Ok(())
    }

    fn lock_jobs(&self) -> InsightsResult<std::sync::MutexGuard<'_, JoinSet<()>>> {
        self.jobs
            .lock()
            .map_err(|err| InsightsError::Internal(format!("background jobs poisoned: {err}")))
    }
}

fn log_join_error(result: Result<(), JoinError>) {
    match result {
        Err(err) if err.is_panic() => error!(error = %err, "background job panicked"),
        Ok(()) | Err(_) => {}
    }
}
