use std::fmt;

use crate::config::FATAL_SIGNALS;
use crate::engine::FatalSignal;

/// Failure of a single request to the backend (network error or non-2xx).
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    /// HTTP status, when a response was received at all
    pub status: Option<u16>,
    /// Structured fatal signal, when the backend sent one
    pub signal: Option<FatalSignal>,
    pub message: String,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            signal: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            signal: None,
            message: message.into(),
        }
    }

    pub fn with_signal(mut self, signal: FatalSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// The fatal signal this failure carries, if any.
    ///
    /// A structured signal wins; otherwise the message is scanned for the
    /// legacy fragments older backends put in plain error text.
    pub fn fatal_signal(&self) -> Option<FatalSignal> {
        self.signal
            .or_else(|| signal_from_message(&self.message))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "network error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Map a structured error `code` to its fatal signal.
pub fn signal_from_code(code: &str) -> Option<FatalSignal> {
    FATAL_SIGNALS
        .iter()
        .find(|rule| rule.code.eq_ignore_ascii_case(code.trim()))
        .map(|rule| rule.signal)
}

/// Scan free-form error text for a legacy fatal fragment.
pub fn signal_from_message(message: &str) -> Option<FatalSignal> {
    let lower = message.to_lowercase();
    FATAL_SIGNALS
        .iter()
        .find(|rule| lower.contains(rule.legacy_fragment))
        .map(|rule| rule.signal)
}
