use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{SEED_MESSAGES, SESSIONS};
use crate::ui::chat::{ChatEvent, ChatTimeline, EventKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub is_active: bool,
}

/// Sidebar sessions plus the chat history parked for each one.
#[derive(Debug)]
pub struct SessionDirectory {
    sessions: Vec<Session>,
    histories: HashMap<String, Vec<ChatEvent>>,
}

impl SessionDirectory {
    pub fn from_seeds(active_id: &str) -> Self {
        let sessions = SESSIONS
            .iter()
            .map(|seed| Session {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                date_label: seed.date_label.to_string(),
                is_active: seed.id == active_id,
            })
            .collect();
        let mut directory = Self {
            sessions,
            histories: HashMap::new(),
        };
        directory.ensure_listed(active_id);
        directory
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_id(&self) -> Option<&str> {
        self.sessions
            .iter()
            .find(|s| s.is_active)
            .map(|s| s.id.as_str())
    }

    /// Mark `id` active (adding it if unknown) and exactly one entry stays active.
    pub fn activate(&mut self, id: &str) {
        self.ensure_listed(id);
        for session in &mut self.sessions {
            session.is_active = session.id == id;
        }
    }

    /// Park a session's timeline; pending placeholders are not worth keeping.
    pub fn store_history(&mut self, id: &str, events: Vec<ChatEvent>) {
        let settled = events.into_iter().filter(|e| !e.is_pending()).collect();
        self.histories.insert(id.to_string(), settled);
    }

    /// Stored history for `id`, or its greeting if it has never been opened.
    pub fn take_history(&mut self, id: &str, symbol: &str) -> Vec<ChatEvent> {
        self.histories
            .remove(id)
            .unwrap_or_else(|| greeting_history(id, symbol))
    }

    fn ensure_listed(&mut self, id: &str) {
        if !self.sessions.iter().any(|s| s.id == id) {
            self.sessions.push(Session {
                id: id.to_string(),
                title: format!("Session {}", id),
                date_label: "now".to_string(),
                is_active: false,
            });
        }
    }
}

/// Opening lines for a session that has no saved history yet.
pub fn greeting_history(session_id: &str, symbol: &str) -> Vec<ChatEvent> {
    let greeting = ChatTimeline::seed_event(
        format!("init-{}", session_id),
        format!(
            "Session {} initialized. Analyzing real-time symbolic data for {}. Market accumulation detected in Q3 quadrant.",
            session_id, symbol
        ),
    );

    let notes = SEED_MESSAGES
        .iter()
        .filter(|seed| seed.session_id == session_id)
        .map(|seed| ChatEvent {
            kind: EventKind::Message,
            ..ChatTimeline::seed_event(seed.id, seed.content)
        });

    std::iter::once(greeting).chain(notes).collect()
}
