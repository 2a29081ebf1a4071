use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Forecast;
use crate::utils::app_time::now_utc;

/// Shown when the chat engine cannot be reached or answers garbage.
pub const ENGINE_UNREACHABLE_MESSAGE: &str = "Error: I cannot reach the Scribe Engine right now.";
/// Shown when the engine answered but produced no text.
pub const EMPTY_REPLY_MESSAGE: &str = "I couldn't generate a response.";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Message,
    /// Provisional "thinking" entry, removable by id
    Placeholder,
    /// Synthetic notice (context switches, session greetings)
    System,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    pub forecast_summary: Option<Forecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: EventId,
    pub role: Role,
    pub kind: EventKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<EventMetadata>,
}

impl ChatEvent {
    pub fn is_pending(&self) -> bool {
        self.kind == EventKind::Placeholder
    }

    pub fn forecast_summary(&self) -> Option<&Forecast> {
        self.metadata.as_ref()?.forecast_summary.as_ref()
    }
}

/// What a settled job hands back to its placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderOutcome {
    Text(String),
    Forecast(Forecast),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// The single "thinking" slot is already taken
    PlaceholderInFlight(EventId),
    /// No placeholder with this id (already resolved, or its session was switched away)
    UnknownPlaceholder(EventId),
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineError::PlaceholderInFlight(id) => {
                write!(f, "Placeholder {} is still waiting for its result", id)
            }
            TimelineError::UnknownPlaceholder(id) => write!(f, "No pending placeholder {}", id),
        }
    }
}

impl std::error::Error for TimelineError {}

/// Ordered chat log. Append-only except for placeholder resolution and
/// wholesale reset on session switch.
#[derive(Debug, Default)]
pub struct ChatTimeline {
    events: Vec<ChatEvent>,
    next_seq: u64,
    /// Bumped once per observable change
    revision: u64,
}

impl ChatTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ChatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Id of the in-flight placeholder, if any.
    pub fn pending_placeholder(&self) -> Option<&EventId> {
        self.events.iter().find(|e| e.is_pending()).map(|e| &e.id)
    }

    pub fn is_agent_typing(&self) -> bool {
        self.pending_placeholder().is_some()
    }

    /// Optimistic user message; nothing gates it on the network.
    pub fn append_user(&mut self, content: impl Into<String>) -> EventId {
        self.push(Role::User, EventKind::Message, content.into(), None)
    }

    pub fn append_placeholder(&mut self) -> Result<EventId, TimelineError> {
        if let Some(id) = self.pending_placeholder() {
            return Err(TimelineError::PlaceholderInFlight(id.clone()));
        }
        Ok(self.push(Role::Agent, EventKind::Placeholder, String::new(), None))
    }

    /// Swap the placeholder for its result in one step.
    pub fn resolve_placeholder(
        &mut self,
        id: &EventId,
        outcome: PlaceholderOutcome,
    ) -> Result<EventId, TimelineError> {
        let index = self
            .events
            .iter()
            .position(|e| &e.id == id && e.is_pending())
            .ok_or_else(|| TimelineError::UnknownPlaceholder(id.clone()))?;

        let (content, metadata) = match outcome {
            PlaceholderOutcome::Text(text) => (text, None),
            PlaceholderOutcome::Forecast(forecast) => (
                forecast_content(&forecast),
                Some(EventMetadata {
                    forecast_summary: Some(forecast),
                }),
            ),
        };

        self.events.remove(index);
        let event = self.make_event(Role::Agent, EventKind::Message, content, metadata);
        let new_id = event.id.clone();
        self.events.push(event);
        self.revision += 1;
        Ok(new_id)
    }

    pub fn append_system(&mut self, content: impl Into<String>) -> EventId {
        self.push(Role::Agent, EventKind::System, content.into(), None)
    }

    /// Replace the whole log (session switch). Returns the outgoing events.
    pub fn reset(&mut self, history: Vec<ChatEvent>) -> Vec<ChatEvent> {
        self.revision += 1;
        std::mem::replace(&mut self.events, history)
    }

    /// Build a system event without appending it, e.g. for seeding a history.
    pub fn seed_event(id: impl Into<String>, content: impl Into<String>) -> ChatEvent {
        ChatEvent {
            id: EventId(id.into()),
            role: Role::Agent,
            kind: EventKind::System,
            content: content.into(),
            timestamp: now_utc(),
            metadata: None,
        }
    }

    fn push(
        &mut self,
        role: Role,
        kind: EventKind,
        content: String,
        metadata: Option<EventMetadata>,
    ) -> EventId {
        let event = self.make_event(role, kind, content, metadata);
        let id = event.id.clone();
        self.events.push(event);
        self.revision += 1;
        id
    }

    fn make_event(
        &mut self,
        role: Role,
        kind: EventKind,
        content: String,
        metadata: Option<EventMetadata>,
    ) -> ChatEvent {
        self.next_seq += 1;
        ChatEvent {
            id: EventId(format!("evt-{}", self.next_seq)),
            role,
            kind,
            content,
            timestamp: now_utc(),
            metadata,
        }
    }
}

fn forecast_content(forecast: &Forecast) -> String {
    if forecast.is_degraded() {
        format!(
            "Forecast for {} is unavailable ({}).",
            forecast.symbol, forecast.history_used
        )
    } else {
        format!(
            "Forecast for {}: {} with {:.0}% confidence.",
            forecast.symbol,
            forecast.prediction_token,
            forecast.confidence * 100.0
        )
    }
}
