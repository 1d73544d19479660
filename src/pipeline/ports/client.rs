//! Pipeline client port.

use crate::pipeline::domain::PipelineRunOptions;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pipeline submissions.
pub type PipelineClientResult<T> = Result<T, PipelineClientError>;

/// Submits pipeline runs to the conversion worker.
#[async_trait]
pub trait PipelineClient: Send + Sync {
    /// Submits `options`, returning once the worker accepted the request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineClientError::Rejected`] when the worker refuses the
    /// run and [`PipelineClientError::Transport`] when it cannot be reached.
    async fn run(&self, options: &PipelineRunOptions) -> PipelineClientResult<()>;
}

/// Errors returned while submitting a pipeline run.
#[derive(Debug, Clone, Error)]
pub enum PipelineClientError {
    /// The worker refused the run.
    #[error("pipeline run rejected: {0}")]
    Rejected(String),

    /// The worker could not be reached.
    #[error("pipeline transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl PipelineClientError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
