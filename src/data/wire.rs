//! JSON shapes exchanged with the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{JobStatus, JobStatusReport};

/// Body of both the submit (`202`) and poll responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub result: Option<Value>,
}

impl From<TaskResponse> for JobStatusReport {
    fn from(resp: TaskResponse) -> Self {
        JobStatusReport::new(JobStatus::parse(&resp.status), resp.result)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub symbol: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Error body. FastAPI puts the text in `detail`; newer routes add `code`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_body_normalises_status() {
        let resp: TaskResponse =
            serde_json::from_str(r#"{"task_id":"abc","status":"started","result":null}"#).unwrap();
        let report: JobStatusReport = resp.into();
        assert_eq!(report.status, JobStatus::Processing);
        assert!(report.result.is_none());
    }

    #[test]
    fn error_body_reads_detail_and_code() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Model warming up","code":"cold_start"}"#).unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("Model warming up"));
        assert_eq!(body.code.as_deref(), Some("cold_start"));
    }
}
