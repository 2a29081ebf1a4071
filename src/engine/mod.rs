pub mod error;
pub mod forecast;
pub mod job;
pub mod poller;

// Re-export key components
pub use error::JobError;
pub use forecast::ForecastService;
pub use job::{FatalSignal, Job, JobHandle, JobRequest, JobResult, JobStatus, JobStatusReport};
pub use poller::{JobPoller, PollDecision, PollState};
