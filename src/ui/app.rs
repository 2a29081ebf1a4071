use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::config::{DEFAULT_SESSION_ID, DEFAULT_SYMBOL, PRINT_SNAPSHOTS, PollPolicy};
use crate::data::ScribeBackend;
use crate::domain::Timeframe;
use crate::engine::{ForecastService, JobPoller};
use crate::ui::chat::{
    ChatTimeline, EMPTY_REPLY_MESSAGE, ENGINE_UNREACHABLE_MESSAGE, EventId, PlaceholderOutcome,
    TimelineError,
};
use crate::ui::messages::AppEvent;
use crate::ui::sessions::SessionDirectory;
use crate::ui::view_state::{ApplyOutcome, ViewSnapshot, ViewStateController};

/// Error types for user actions the app refuses
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Nothing to send
    EmptyMessage,
    /// The agent is still working on an earlier request
    AgentBusy(EventId),
    /// Any other timeline refusal
    Timeline(TimelineError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EmptyMessage => write!(f, "Message is empty"),
            AppError::AgentBusy(id) => write!(f, "Agent is still answering ({})", id),
            AppError::Timeline(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<TimelineError> for AppError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::PlaceholderInFlight(id) => AppError::AgentBusy(id),
            other => AppError::Timeline(other),
        }
    }
}

/// Starting point of a dashboard session.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub session_id: String,
    pub poll: PollPolicy,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: Timeframe::default(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

/// Orchestrates user actions, background work and their completions.
///
/// All state lives here and is only touched from the task driving the app;
/// background tasks talk back exclusively through `event_tx`.
pub struct ScribeApp {
    pub(super) view: ViewStateController,
    pub(super) chat: ChatTimeline,
    pub(super) sessions: SessionDirectory,
    pub(super) backend: Arc<dyn ScribeBackend>,
    pub(super) forecasts: ForecastService,
    pub(super) event_tx: UnboundedSender<AppEvent>,
    pub(super) event_rx: UnboundedReceiver<AppEvent>,
    pub(super) in_flight: usize,
}

impl ScribeApp {
    pub fn new(backend: Arc<dyn ScribeBackend>, settings: AppSettings) -> Self {
        let view = ViewStateController::new(&settings.symbol, settings.timeframe, &settings.session_id);
        let mut sessions = SessionDirectory::from_seeds(&settings.session_id);

        let mut chat = ChatTimeline::new();
        chat.reset(sessions.take_history(&settings.session_id, &view.view().symbol));

        let forecasts = ForecastService::new(Arc::clone(&backend), JobPoller::new(settings.poll));
        let (event_tx, event_rx) = unbounded_channel();

        log::info!(
            "Dashboard ready on {} ({} {}, session {})",
            backend.signature(),
            view.view().symbol,
            view.view().timeframe,
            view.view().session_id
        );

        Self {
            view,
            chat,
            sessions,
            backend,
            forecasts,
            event_tx,
            event_rx,
            in_flight: 0,
        }
    }

    /// Kick off the first market-data load.
    pub fn start(&mut self) {
        let ticket = self.view.initial_load();
        self.spawn_market_load(ticket);
    }

    pub fn view(&self) -> &ViewStateController {
        &self.view
    }

    pub fn chat(&self) -> &ChatTimeline {
        &self.chat
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot(&self.chat, &self.sessions)
    }

    // --- USER ACTIONS ---

    pub fn set_symbol(&mut self, raw: &str) -> bool {
        match self.view.set_symbol(raw, &mut self.chat) {
            Some(ticket) => {
                self.spawn_market_load(ticket);
                true
            }
            None => false,
        }
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        match self.view.set_timeframe(timeframe) {
            Some(ticket) => {
                self.spawn_market_load(ticket);
                true
            }
            None => false,
        }
    }

    pub fn select_session(&mut self, id: &str) -> bool {
        self.view
            .select_session(id, &mut self.chat, &mut self.sessions)
    }

    /// Optimistically show the user's message, then ask the engine.
    pub fn send_message(&mut self, text: &str) -> Result<EventId, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }
        if let Some(id) = self.chat.pending_placeholder() {
            return Err(AppError::AgentBusy(id.clone()));
        }

        let user_id = self.chat.append_user(text);
        let placeholder = self.chat.append_placeholder()?;
        let symbol = self.view.view().symbol.clone();
        self.spawn_chat(text.to_string(), symbol, placeholder);
        Ok(user_id)
    }

    /// Run a forecast job for the current symbol; the result lands as a chat card.
    pub fn request_forecast(&mut self) -> Result<EventId, AppError> {
        let placeholder = self.chat.append_placeholder()?;
        let generation = self.view.generation();
        let symbol = self.view.view().symbol.clone();
        self.spawn_forecast(generation, symbol, placeholder.clone());
        Ok(placeholder)
    }

    // --- COMPLETIONS ---

    pub(super) fn handle_event(&mut self, event: AppEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            AppEvent::MarketData {
                generation,
                symbol,
                timeframe,
                payload,
            } => {
                if self.view.apply_load_result(generation, payload) == ApplyOutcome::Applied {
                    log::info!(
                        "Loaded {} candles for {} ({})",
                        self.view.candles().len(),
                        symbol,
                        timeframe
                    );
                }
            }
            AppEvent::Forecast {
                generation,
                placeholder,
                forecast,
            } => {
                self.view.apply_forecast(generation, &forecast);
                self.resolve(&placeholder, PlaceholderOutcome::Forecast(forecast));
            }
            AppEvent::ChatReply { placeholder, reply } => {
                let text = match reply {
                    Ok(Some(text)) => text,
                    Ok(None) => EMPTY_REPLY_MESSAGE.to_string(),
                    Err(err) => {
                        log::error!("Chat request failed: {}", err);
                        ENGINE_UNREACHABLE_MESSAGE.to_string()
                    }
                };
                self.resolve(&placeholder, PlaceholderOutcome::Text(text));
            }
        }

        if PRINT_SNAPSHOTS {
            log::info!("{:?}", self.snapshot());
        }
    }

    fn resolve(&mut self, placeholder: &EventId, outcome: PlaceholderOutcome) {
        if let Err(err) = self.chat.resolve_placeholder(placeholder, outcome) {
            // Its session was switched away while the job ran.
            log::debug!("Dropping chat result: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransportError;
    use crate::data::fake::{FakeBackend, sample_candles};
    use crate::domain::PredictionToken;
    use crate::ui::chat::{EventKind, Role};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn app_with(backend: Arc<FakeBackend>) -> ScribeApp {
        let settings = AppSettings {
            poll: PollPolicy::new(0, 5),
            ..AppSettings::default()
        };
        ScribeApp::new(backend, settings)
    }

    #[test]
    fn timeline_refusals_keep_their_meaning() {
        let id = EventId("evt-7".into());
        assert_eq!(
            AppError::from(TimelineError::PlaceholderInFlight(id.clone())),
            AppError::AgentBusy(id.clone())
        );
        let err = AppError::from(TimelineError::UnknownPlaceholder(id.clone()));
        assert_eq!(
            err,
            AppError::Timeline(TimelineError::UnknownPlaceholder(id))
        );
        assert_eq!(err.to_string(), "No pending placeholder evt-7");
    }

    #[tokio::test]
    async fn initial_load_populates_chart() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_history("MSFT", Ok(sample_candles(300.0, 8)));
        let mut app = app_with(backend);

        app.start();
        assert!(app.snapshot().is_loading);
        app.settle().await;

        let snap = app.snapshot();
        assert!(!snap.is_loading);
        assert_eq!(snap.candles.len(), 8);
        assert_eq!(snap.generation, 0);
        assert!(snap.events[0].content.contains("Session 1 initialized"));
    }

    #[tokio::test]
    async fn overlapping_symbol_switches_keep_the_newest_data() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_history("AAPL", Ok(sample_candles(10.0, 3)));
        backend.set_history("TSLA", Ok(sample_candles(900.0, 7)));
        backend.gate_history("AAPL");
        let mut app = app_with(backend.clone());

        assert!(app.set_symbol("aapl"));
        assert!(app.set_symbol("tsla"));

        // TSLA (generation 2) lands first.
        app.next_event().await;
        assert_eq!(app.snapshot().candles.len(), 7);

        // The slow AAPL response (generation 1) arrives afterwards and is dropped.
        backend.release("AAPL");
        app.settle().await;

        let snap = app.snapshot();
        assert_eq!(snap.symbol, "TSLA");
        assert_eq!(snap.generation, 2);
        assert_eq!(snap.candles.len(), 7);
        assert_eq!(snap.candles[0].close, 900.0);
        assert_eq!(backend.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn chat_round_trip_replaces_placeholder() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat(Ok(Some("MSFT looks range-bound.".into())));
        backend.push_chat(Ok(None));
        backend.push_chat(Err(TransportError::network("connection refused")));
        let mut app = app_with(backend);

        assert_eq!(app.send_message("   "), Err(AppError::EmptyMessage));

        for expected in [
            "MSFT looks range-bound.",
            EMPTY_REPLY_MESSAGE,
            ENGINE_UNREACHABLE_MESSAGE,
        ] {
            app.send_message("thoughts?").unwrap();
            assert!(app.snapshot().is_agent_typing);
            assert!(matches!(
                app.send_message("again"),
                Err(AppError::AgentBusy(_))
            ));
            app.settle().await;

            let last = app.chat().events().last().unwrap();
            assert_eq!(last.role, Role::Agent);
            assert_eq!(last.content, expected);
            assert!(!app.snapshot().is_agent_typing);
        }
    }

    #[tokio::test]
    async fn forecast_lands_as_card_and_header() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_poll("pending", None);
        backend.push_poll(
            "completed",
            Some(json!({"symbol": "MSFT", "prediction": "P_SURGE_V_HIGH", "confidence": 0.89})),
        );
        let mut app = app_with(backend);

        app.request_forecast().unwrap();
        app.settle().await;

        let card = app.chat().events().last().unwrap();
        let summary = card.forecast_summary().unwrap();
        assert_eq!(summary.prediction_token, PredictionToken::P_SURGE_V_HIGH);
        assert_eq!(
            app.view().latest_forecast().map(|f| f.confidence),
            Some(0.89)
        );
    }

    #[tokio::test]
    async fn forecast_after_symbol_switch_only_updates_chat() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_poll(
            "completed",
            Some(json!({"symbol": "MSFT", "prediction_token": "P_CRASH_MED", "confidence": 0.6})),
        );
        let mut app = app_with(backend);

        app.request_forecast().unwrap();
        app.set_symbol("NVDA");
        app.settle().await;

        assert!(app.view().latest_forecast().is_none());
        let cards: Vec<_> = app
            .chat()
            .events()
            .iter()
            .filter_map(|e| e.forecast_summary())
            .collect();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].symbol, "MSFT");
        assert!(app.chat().events().iter().any(|e| e.kind == EventKind::System
            && e.content.starts_with("Switched context to NVDA")));
    }

    #[tokio::test]
    async fn timed_out_forecast_still_renders() {
        let backend = Arc::new(FakeBackend::new());
        let mut app = app_with(backend.clone());

        app.request_forecast().unwrap();
        app.settle().await;

        let card = app.chat().events().last().unwrap();
        let summary = card.forecast_summary().unwrap();
        assert_eq!(summary.confidence, 0.0);
        assert_eq!(summary.history_used, "Error: Timeout or Service Down");
        assert_eq!(backend.poll_count(), 5);
    }

    #[tokio::test]
    async fn reply_for_switched_away_session_is_dropped() {
        let backend = Arc::new(FakeBackend::new());
        let mut app = app_with(backend);

        app.send_message("still there?").unwrap();
        assert!(app.select_session("3"));
        app.settle().await;

        let events = app.chat().events();
        assert_eq!(events.len(), 1);
        assert!(events[0].content.contains("Session 3 initialized"));

        assert!(app.select_session("1"));
        let restored = app.chat().events();
        assert_eq!(restored.last().unwrap().content, "still there?");
        assert!(restored.iter().all(|e| !e.is_pending()));
    }

    #[tokio::test]
    async fn crashed_chat_task_still_settles() {
        let backend = Arc::new(FakeBackend::new());
        backend.crash_chat();
        let mut app = app_with(backend);

        app.send_message("are you there?").unwrap();
        app.settle().await;

        assert!(!app.is_busy());
        assert!(!app.snapshot().is_agent_typing);
        assert_eq!(
            app.chat().events().last().unwrap().content,
            ENGINE_UNREACHABLE_MESSAGE
        );
    }

    #[tokio::test]
    async fn update_drains_without_blocking() {
        let backend = Arc::new(FakeBackend::new());
        let mut app = app_with(backend);
        assert!(!app.update());

        app.start();
        while app.update() {
            tokio::task::yield_now().await;
        }
        assert!(!app.snapshot().is_loading);
    }
}
