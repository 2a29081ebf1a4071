use std::sync::Arc;

use crate::data::ScribeBackend;
use crate::domain::{Forecast, ForecastPayload};

use super::error::JobError;
use super::job::{JobHandle, JobRequest};
use super::poller::JobPoller;

/// Runs "forecast" jobs and always hands back something renderable.
#[derive(Clone)]
pub struct ForecastService {
    backend: Arc<dyn ScribeBackend>,
    poller: JobPoller,
}

impl ForecastService {
    pub fn new(backend: Arc<dyn ScribeBackend>, poller: JobPoller) -> Self {
        Self { backend, poller }
    }

    /// Submit, poll and map. Never fails: errors become a degraded forecast.
    pub async fn forecast(&self, symbol: &str) -> Forecast {
        let request = JobRequest::Forecast {
            symbol: symbol.to_string(),
        };
        let backend = self.backend.as_ref();

        let outcome = self
            .poller
            .run(
                || backend.submit_job(&request),
                |handle: JobHandle| async move { backend.job_status(&handle).await },
            )
            .await;

        match outcome {
            Ok(result) => match serde_json::from_value::<ForecastPayload>(result.into_payload()) {
                Ok(payload) => payload.into_forecast(symbol),
                Err(e) => {
                    log::error!("Forecast payload for {} could not be decoded: {}", symbol, e);
                    Forecast::degraded(symbol, "Error: Malformed Forecast")
                }
            },
            Err(err) => {
                log::error!("Forecast for {} degraded ({}): {}", symbol, err.category(), err);
                Forecast::degraded(symbol, degraded_reason(&err))
            }
        }
    }
}

/// `history_used` text naming the failure category.
pub fn degraded_reason(err: &JobError) -> String {
    match err {
        JobError::SubmissionFailed(_) => "Error: Queue Unavailable".to_string(),
        JobError::Fatal { .. } => "Error: Engine Unavailable".to_string(),
        JobError::ResultError(msg) => format!("Error: {}", msg),
        JobError::Failed(_) => "Error: Forecast Failed".to_string(),
        JobError::Timeout { .. } => "Error: Timeout or Service Down".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollPolicy;
    use crate::data::TransportError;
    use crate::data::fake::FakeBackend;
    use crate::domain::PredictionToken;
    use serde_json::json;

    fn service(backend: Arc<FakeBackend>, max_attempts: u32) -> ForecastService {
        ForecastService::new(backend, JobPoller::new(PollPolicy::new(0, max_attempts)))
    }

    #[tokio::test]
    async fn completed_job_maps_to_typed_forecast() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_poll("pending", None);
        backend.push_poll(
            "completed",
            Some(json!({
                "symbol": "NVDA",
                "prediction_token": "P_SURGE_V_HIGH",
                "confidence": 0.89,
                "history_used": "60 Days (Symbolized)"
            })),
        );

        let forecast = service(backend.clone(), 30).forecast("NVDA").await;
        assert_eq!(forecast.prediction_token, PredictionToken::P_SURGE_V_HIGH);
        assert_eq!(forecast.confidence, 0.89);
        assert_eq!(forecast.history_used, "60 Days (Symbolized)");
        assert_eq!(backend.poll_count(), 2);
    }

    #[tokio::test]
    async fn timeout_degrades_with_category() {
        let backend = Arc::new(FakeBackend::new());
        let forecast = service(backend.clone(), 3).forecast("MSFT").await;

        assert_eq!(forecast.symbol, "MSFT");
        assert_eq!(forecast.prediction_token, PredictionToken::P_STABLE);
        assert_eq!(forecast.confidence, 0.0);
        assert_eq!(forecast.history_used, "Error: Timeout or Service Down");
        assert_eq!(backend.poll_count(), 3);
    }

    #[tokio::test]
    async fn every_failure_category_is_renderable() {
        let submit_fail = Arc::new(FakeBackend::new());
        submit_fail.push_submit(Err(TransportError::http(500, "Queue Error: down")));
        let f = service(submit_fail, 3).forecast("AAPL").await;
        assert_eq!(f.history_used, "Error: Queue Unavailable");

        let fatal = Arc::new(FakeBackend::new());
        fatal.push_poll_error(TransportError::http(502, "Scribe unreachable"));
        let f = service(fatal, 3).forecast("AAPL").await;
        assert_eq!(f.history_used, "Error: Engine Unavailable");

        let embedded = Arc::new(FakeBackend::new());
        embedded.push_poll("success", Some(json!({"error": "No market data found for AAPL"})));
        let f = service(embedded, 3).forecast("AAPL").await;
        assert_eq!(f.history_used, "Error: No market data found for AAPL");

        let failed = Arc::new(FakeBackend::new());
        failed.push_poll("failed", Some(json!("OOM")));
        let f = service(failed, 3).forecast("AAPL").await;
        assert_eq!(f.history_used, "Error: Forecast Failed");

        let malformed = Arc::new(FakeBackend::new());
        malformed.push_poll("completed", Some(json!({"prediction_token": "P_TO_THE_MOON"})));
        let f = service(malformed, 3).forecast("AAPL").await;
        assert_eq!(f.history_used, "Error: Malformed Forecast");
        assert!(f.is_degraded());
    }
}
