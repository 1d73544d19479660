//! In-memory pipeline client that records submissions.

use crate::pipeline::{
    domain::PipelineRunOptions,
    ports::{PipelineClient, PipelineClientError, PipelineClientResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Pipeline client that keeps every accepted submission in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingPipelineClient {
    state: Arc<RwLock<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    submissions: Vec<PipelineRunOptions>,
    rejection: Option<String>,
}

impl RecordingPipelineClient {
    /// Creates a client that accepts every run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects subsequent runs with `message`, or accepts them again when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineClientError::Transport`] when the state lock is
    /// poisoned.
    pub fn reject_with(&self, message: Option<&str>) -> PipelineClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.rejection = message.map(str::to_owned);
        Ok(())
    }

    /// Returns the accepted submissions in order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineClientError::Transport`] when the state lock is
    /// poisoned.
    pub fn submissions(&self) -> PipelineClientResult<Vec<PipelineRunOptions>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.submissions.clone())
    }
}

fn lock_error(err: impl std::fmt::Display) -> PipelineClientError {
    PipelineClientError::transport(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PipelineClient for RecordingPipelineClient {
    async fn run(&self, options: &PipelineRunOptions) -> PipelineClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(message) = &state.rejection {
            return Err(PipelineClientError::Rejected(message.clone()));
        }
        state.submissions.push(options.clone());
        Ok(())
    }
}
