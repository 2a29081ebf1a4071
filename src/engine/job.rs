use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::utils::app_time::now_utc;

/// Opaque backend job id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(pub String);

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of backend work to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Forecast { symbol: String },
}

impl JobRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            JobRequest::Forecast { .. } => "forecast",
        }
    }
}

/// Normalised job status. Ordered: a job only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// The one place backend status strings are interpreted.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => JobStatus::Pending,
            "processing" | "started" | "retry" | "running" => JobStatus::Processing,
            "completed" | "success" | "succeeded" => JobStatus::Completed,
            "failed" | "failure" | "revoked" | "error" => JobStatus::Failed,
            other => {
                log::warn!("Unknown job status {:?}; treating as processing", other);
                JobStatus::Processing
            }
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Job-kind-specific payload returned by a completed (or failed) job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobResult(pub Value);

impl JobResult {
    pub fn into_payload(self) -> Value {
        self.0
    }

    /// Business-logic failure tucked inside a "successful" envelope.
    /// Only a set error field counts; falsy values (`""`, `false`, `{}`) mean none.
    pub fn embedded_error(&self) -> Option<String> {
        match self.0.get("error")? {
            Value::Null | Value::Bool(false) => None,
            Value::String(msg) if msg.trim().is_empty() => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            Value::String(msg) => Some(msg.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Best human-readable description of a failed job's payload.
    pub fn failure_message(&self) -> Option<String> {
        match &self.0 {
            Value::Null => None,
            Value::String(msg) if msg.trim().is_empty() => None,
            Value::String(msg) => Some(msg.clone()),
            _ => self.embedded_error(),
        }
    }
}

/// One poll observation.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    pub result: Option<JobResult>,
}

impl JobStatusReport {
    pub fn new(status: JobStatus, result: Option<Value>) -> Self {
        Self {
            status,
            result: result.filter(|v| !v.is_null()).map(JobResult),
        }
    }
}

/// Non-recoverable conditions the backend can signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FatalSignal {
    /// Model still loading on the inference host
    ColdStart,
    /// Gateway cannot reach the inference host
    UpstreamUnreachable,
}

impl fmt::Display for FatalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalSignal::ColdStart => write!(f, "cold start"),
            FatalSignal::UpstreamUnreachable => write!(f, "upstream unreachable"),
        }
    }
}

/// Client-side record of one submitted job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobHandle,
    pub status: JobStatus,
    pub result: Option<JobResult>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn submitted(id: JobHandle) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            result: None,
            submitted_at: now_utc(),
        }
    }

    /// Apply a poll report. Returns false (and changes nothing) when the
    /// report would move the job backwards.
    pub fn advance(&mut self, report: JobStatusReport) -> bool {
        if report.status < self.status {
            log::debug!(
                "[job {}] ignoring backwards transition {} -> {}",
                self.id,
                self.status,
                report.status
            );
            return false;
        }
        self.status = report.status;
        if report.result.is_some() {
            self.result = report.result;
        }
        true
    }
}
