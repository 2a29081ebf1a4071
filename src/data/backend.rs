use async_trait::async_trait;

use crate::data::TransportError;
use crate::domain::{Candle, Timeframe};
use crate::engine::{JobHandle, JobRequest, JobStatusReport};

/// Everything the dashboard core needs from the backend.
#[async_trait]
pub trait ScribeBackend: Send + Sync {
    /// Fire-and-forget trigger for an asynchronous job.
    async fn submit_job(&self, request: &JobRequest) -> Result<JobHandle, TransportError>;

    /// One poll of a submitted job.
    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatusReport, TransportError>;

    /// Synchronous market-data load (no job, no polling).
    async fn market_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, TransportError>;

    /// Single-shot chat completion. `None` when the engine answered without text.
    async fn chat(&self, message: &str, symbol: &str) -> Result<Option<String>, TransportError>;

    /// A unique identifier for this implementation (shows up in logs).
    fn signature(&self) -> &'static str;
}
