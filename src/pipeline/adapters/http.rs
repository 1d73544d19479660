//! HTTP client for the conversion worker's pipeline endpoint.

use crate::pipeline::{
    domain::PipelineRunOptions,
    ports::{PipelineClient, PipelineClientError, PipelineClientResult},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Submits pipeline runs with `POST {base_url}/v3/pipelines/run`.
#[derive(Clone)]
pub struct HttpPipelineClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpPipelineClient {
    /// Creates a client for the worker at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Returns the run endpoint URL without credentials.
    #[must_use]
    pub fn run_url(&self) -> String {
        format!("{}/v3/pipelines/run", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for HttpPipelineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPipelineClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl PipelineClient for HttpPipelineClient {
    async fn run(&self, options: &PipelineRunOptions) -> PipelineClientResult<()> {
        let url = self.run_url();
        debug!(
            %url,
            pipeline = %options.pipeline_id,
            task_id = %options.task_id,
            snapshot_id = %options.snapshot_id,
            "submitting pipeline run"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .json(options)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(PipelineClientError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineClientError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}
