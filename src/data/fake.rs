//! Scripted in-memory backend for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::data::{ScribeBackend, TransportError};
use crate::domain::{Candle, Timeframe};
use crate::engine::{JobHandle, JobRequest, JobStatus, JobStatusReport};

#[derive(Default)]
pub struct FakeBackend {
    submits: Mutex<VecDeque<Result<JobHandle, TransportError>>>,
    polls: Mutex<VecDeque<Result<JobStatusReport, TransportError>>>,
    histories: Mutex<HashMap<String, Result<Vec<Candle>, TransportError>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    chat_replies: Mutex<VecDeque<Result<Option<String>, TransportError>>>,
    chat_panics: AtomicBool,
    pub poll_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_submit(&self, outcome: Result<JobHandle, TransportError>) {
        self.submits.lock().unwrap().push_back(outcome);
    }

    pub fn push_poll(&self, status: &str, result: Option<serde_json::Value>) {
        self.polls
            .lock()
            .unwrap()
            .push_back(Ok(JobStatusReport::new(JobStatus::parse(status), result)));
    }

    pub fn push_poll_error(&self, err: TransportError) {
        self.polls.lock().unwrap().push_back(Err(err));
    }

    pub fn set_history(&self, symbol: &str, outcome: Result<Vec<Candle>, TransportError>) {
        self.histories
            .lock()
            .unwrap()
            .insert(symbol.to_string(), outcome);
    }

    /// Hold every history request for `symbol` until `release` is called.
    pub fn gate_history(&self, symbol: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, symbol: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(symbol) {
            gate.add_permits(1);
        }
    }

    pub fn push_chat(&self, outcome: Result<Option<String>, TransportError>) {
        self.chat_replies.lock().unwrap().push_back(outcome);
    }

    /// Make every chat request panic mid-flight.
    pub fn crash_chat(&self) {
        self.chat_panics.store(true, Ordering::SeqCst);
    }

    pub fn poll_count(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

/// A short deterministic series whose closes are offset by `base`.
pub fn sample_candles(base: f64, len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let close = base + i as f64;
            Candle::new(format!("2024-02-{:02}", i + 1), close, close + 1.0, close - 1.0, close)
        })
        .collect()
}

#[async_trait]
impl ScribeBackend for FakeBackend {
    fn signature(&self) -> &'static str {
        "Fake backend"
    }

    async fn submit_job(&self, _request: &JobRequest) -> Result<JobHandle, TransportError> {
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobHandle("task-fake".into())))
    }

    async fn job_status(&self, _handle: &JobHandle) -> Result<JobStatusReport, TransportError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatusReport::new(JobStatus::Processing, None)))
    }

    async fn market_history(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, TransportError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(symbol).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.histories
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Ok(sample_candles(100.0, 5)))
    }

    async fn chat(&self, _message: &str, _symbol: &str) -> Result<Option<String>, TransportError> {
        if self.chat_panics.load(Ordering::SeqCst) {
            panic!("chat backend crashed");
        }
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some("Noted.".into())))
    }
}
