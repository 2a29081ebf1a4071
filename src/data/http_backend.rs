use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::BACKEND;
use crate::data::backend::ScribeBackend;
use crate::data::transport::{TransportError, signal_from_code};
use crate::data::wire::{ChatRequest, ChatResponse, ErrorBody, TaskResponse};
use crate::domain::{Candle, Timeframe};
use crate::engine::{JobHandle, JobRequest, JobStatusReport};

/// reqwest-backed client for the scribe gateway.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    ai_prefix: &'static str,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(BACKEND.http.connect_timeout_ms))
            .timeout(Duration::from_millis(BACKEND.http.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ai_prefix: BACKEND.routes.ai_prefix,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ai_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.ai_prefix, path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a `TransportError`.
    async fn check(resp: Response) -> Result<Response, TransportError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(error_from_body(status, &text))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
        let status = resp.status().as_u16();
        resp.json::<T>()
            .await
            .map_err(|e| TransportError::http(status, format!("Malformed response: {}", e)))
    }
}

/// Map a failed response's status and body, keeping any structured signal.
/// The `detail` text becomes the message that legacy fragment detection scans.
fn error_from_body(status: StatusCode, text: &str) -> TransportError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body.detail_text().unwrap_or_else(|| {
        if text.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            text.to_string()
        }
    });

    let err = TransportError::http(status.as_u16(), message);
    match body.code.as_deref().and_then(signal_from_code) {
        Some(signal) => err.with_signal(signal),
        None => err,
    }
}

fn network(err: reqwest::Error) -> TransportError {
    TransportError::network(err.to_string())
}

#[async_trait]
impl ScribeBackend for HttpBackend {
    fn signature(&self) -> &'static str {
        "Scribe HTTP gateway"
    }

    async fn submit_job(&self, request: &JobRequest) -> Result<JobHandle, TransportError> {
        let url = match request {
            JobRequest::Forecast { symbol } => self.ai_url(&format!("/forecast/{}", symbol)),
        };
        let resp = self.client.post(&url).send().await.map_err(network)?;
        let task: TaskResponse = Self::decode(Self::check(resp).await?).await?;

        if task.task_id.trim().is_empty() {
            return Err(TransportError::network("Backend returned an empty task id"));
        }
        log::debug!("Submitted {} job as {}", request.kind(), task.task_id);
        Ok(JobHandle(task.task_id))
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatusReport, TransportError> {
        let url = self.ai_url(&format!("/tasks/{}", handle));
        let resp = self.client.get(&url).send().await.map_err(network)?;
        let task: TaskResponse = Self::decode(Self::check(resp).await?).await?;
        Ok(task.into())
    }

    async fn market_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, TransportError> {
        let url = self.url(&format!("/stocks/{}/history", symbol));
        let resp = self
            .client
            .get(&url)
            .query(&[("timeframe", timeframe.as_query())])
            .send()
            .await
            .map_err(network)?;
        Self::decode(Self::check(resp).await?).await
    }

    async fn chat(&self, message: &str, symbol: &str) -> Result<Option<String>, TransportError> {
        let resp = self
            .client
            .post(self.ai_url("/chat"))
            .json(&ChatRequest { message, symbol })
            .send()
            .await
            .map_err(network)?;
        let reply: ChatResponse = Self::decode(Self::check(resp).await?).await?;
        Ok(reply.response.filter(|text| !text.trim().is_empty()))
    }
}
