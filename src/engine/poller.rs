//! Submit-then-poll driver for one asynchronous backend job.
//!
//! The retry policy lives in [`PollState::observe`], a pure function of the
//! attempt count and the latest observation. [`JobPoller::run`] only adds
//! the I/O and the fixed delay between attempts, so the same state machine
//! can be driven by any executor.

use std::future::Future;

use crate::config::{PRINT_POLL_TICKS, PollPolicy};
use crate::data::TransportError;
use crate::utils::app_time;

use super::error::JobError;
use super::job::{Job, JobHandle, JobResult, JobStatus, JobStatusReport};

/// Fallback message for a failed job whose payload says nothing useful.
const DEFAULT_FAILURE_MESSAGE: &str = "Task failed";

/// What the driver should do after one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum PollDecision {
    /// Wait one interval and poll again
    Retry,
    /// Stop polling with this outcome
    Finish(Result<JobResult, JobError>),
}

/// Decision state for one job run.
#[derive(Debug, Clone)]
pub struct PollState {
    job: Job,
    attempts: u32,
    policy: PollPolicy,
}

impl PollState {
    pub fn new(job: Job, policy: PollPolicy) -> Self {
        Self {
            job,
            attempts: 0,
            policy,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Fold one poll outcome into the state and decide what happens next.
    pub fn observe(&mut self, outcome: Result<JobStatusReport, TransportError>) -> PollDecision {
        self.attempts += 1;

        match outcome {
            Err(err) => {
                if let Some(signal) = err.fatal_signal() {
                    return PollDecision::Finish(Err(JobError::Fatal {
                        signal,
                        message: err.message,
                    }));
                }
                log::warn!(
                    "[job {}] transient poll failure (attempt {}/{}): {}",
                    self.job.id,
                    self.attempts,
                    self.policy.max_attempts,
                    err
                );
            }
            Ok(report) => {
                self.job.advance(report);
                match self.job.status {
                    JobStatus::Completed => {
                        let result = self.job.result.clone().unwrap_or_default();
                        let outcome = match result.embedded_error() {
                            Some(msg) => Err(JobError::ResultError(msg)),
                            None => Ok(result),
                        };
                        return PollDecision::Finish(outcome);
                    }
                    JobStatus::Failed => {
                        let msg = self
                            .job
                            .result
                            .as_ref()
                            .and_then(JobResult::failure_message)
                            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                        return PollDecision::Finish(Err(JobError::Failed(msg)));
                    }
                    JobStatus::Pending | JobStatus::Processing => {}
                }
            }
        }

        if self.attempts >= self.policy.max_attempts {
            PollDecision::Finish(Err(JobError::Timeout {
                attempts: self.attempts,
            }))
        } else {
            PollDecision::Retry
        }
    }
}

/// Stateless runner: one `run` call per job.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobPoller {
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit the job, then poll it until it settles or the attempt budget runs out.
    pub async fn run<S, SubmitFut, P, PollFut>(
        &self,
        submit: S,
        mut poll_once: P,
    ) -> Result<JobResult, JobError>
    where
        S: FnOnce() -> SubmitFut,
        SubmitFut: Future<Output = Result<JobHandle, TransportError>>,
        P: FnMut(JobHandle) -> PollFut,
        PollFut: Future<Output = Result<JobStatusReport, TransportError>>,
    {
        let handle = submit()
            .await
            .map_err(|e| JobError::SubmissionFailed(e.to_string()))?;
        log::debug!("[job {}] submitted", handle);

        if self.policy.max_attempts == 0 {
            return Err(JobError::Timeout { attempts: 0 });
        }

        let started = app_time::now();
        let mut state = PollState::new(Job::submitted(handle.clone()), self.policy);
        loop {
            let outcome = poll_once(handle.clone()).await;
            let decision = state.observe(outcome);

            if PRINT_POLL_TICKS {
                log::info!(
                    "[job {}] attempt {} -> {}",
                    handle,
                    state.attempts(),
                    state.job().status
                );
            }

            match decision {
                PollDecision::Finish(result) => {
                    match &result {
                        Ok(_) => log::debug!(
                            "[job {}] completed after {} polls ({:.1?})",
                            handle,
                            state.attempts(),
                            started.elapsed()
                        ),
                        Err(e @ JobError::Fatal { .. }) => {
                            log::error!("[job {}] {}", handle, e)
                        }
                        Err(e) => log::warn!("[job {}] {}", handle, e),
                    }
                    return result;
                }
                PollDecision::Retry => {
                    let interval = self.policy.interval();
                    if !interval.is_zero() {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }
    }
}
