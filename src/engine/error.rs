use std::fmt;

use super::job::FatalSignal;

/// Terminal outcomes of a job run other than success.
#[derive(Debug, Clone, PartialEq)]
pub enum JobError {
    /// The job could not be submitted at all
    SubmissionFailed(String),
    /// Backend signalled a non-retryable condition while polling
    Fatal { signal: FatalSignal, message: String },
    /// Job completed but its payload carries an error
    ResultError(String),
    /// Job reached the failed status
    Failed(String),
    /// Attempts exhausted without a terminal status
    Timeout { attempts: u32 },
}

impl JobError {
    /// Short label for logs and degraded UI text.
    pub fn category(&self) -> &'static str {
        match self {
            JobError::SubmissionFailed(_) => "submission failed",
            JobError::Fatal { .. } => "fatal",
            JobError::ResultError(_) => "result error",
            JobError::Failed(_) => "failed",
            JobError::Timeout { .. } => "timeout",
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::SubmissionFailed(msg) => write!(f, "Job submission failed: {}", msg),
            JobError::Fatal { signal, message } => {
                write!(f, "Backend reported {}: {}", signal, message)
            }
            JobError::ResultError(msg) => write!(f, "Job completed with error: {}", msg),
            JobError::Failed(msg) => write!(f, "Job failed: {}", msg),
            JobError::Timeout { attempts } => {
                write!(f, "Job did not finish after {} polls", attempts)
            }
        }
    }
}

impl std::error::Error for JobError {}
