use serde::Serialize;
use std::sync::Arc;

#[cfg(debug_assertions)]
use crate::config::PRINT_UI_INTERACTIONS;
use crate::config::PRINT_STALE_DISCARDS;
use crate::data::TransportError;
use crate::domain::{Candle, Forecast, Timeframe, VolatilityRegime, normalize_symbol};
use crate::ui::chat::{ChatEvent, ChatTimeline};
use crate::ui::sessions::{Session, SessionDirectory};

pub type Generation = u64;

/// The reactive triad plus its generation counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub session_id: String,
    pub generation: Generation,
}

/// A market-data reload to issue, stamped with the generation current at issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: Generation,
    pub symbol: String,
    pub timeframe: Timeframe,
}

/// Outcome of a market-data request as the controller receives it.
pub type LoadPayload = Result<Vec<Candle>, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Tagged with a superseded generation; nothing changed
    Stale,
}

/// Immutable view of everything a renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub session_id: String,
    pub generation: Generation,
    pub candles: Arc<Vec<Candle>>,
    pub regime: VolatilityRegime,
    pub latest_forecast: Option<Forecast>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub is_agent_typing: bool,
    pub sessions: Vec<Session>,
    pub events: Vec<ChatEvent>,
}

/// Sole owner of the view state. Every mutation goes through a named transition.
#[derive(Debug)]
pub struct ViewStateController {
    view: ViewState,
    candles: Arc<Vec<Candle>>,
    regime: VolatilityRegime,
    latest_forecast: Option<Forecast>,
    is_loading: bool,
    last_error: Option<String>,
}

impl ViewStateController {
    pub fn new(symbol: &str, timeframe: Timeframe, session_id: &str) -> Self {
        Self {
            view: ViewState {
                symbol: normalize_symbol(symbol).unwrap_or_else(|| symbol.to_string()),
                timeframe,
                session_id: session_id.to_string(),
                generation: 0,
            },
            candles: Arc::new(Vec::new()),
            regime: VolatilityRegime::default(),
            latest_forecast: None,
            is_loading: false,
            last_error: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn generation(&self) -> Generation {
        self.view.generation
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn regime(&self) -> VolatilityRegime {
        self.regime
    }

    pub fn latest_forecast(&self) -> Option<&Forecast> {
        self.latest_forecast.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// First load of the session; uses the current generation without bumping it.
    pub fn initial_load(&mut self) -> LoadTicket {
        self.is_loading = true;
        self.ticket()
    }

    /// Switch symbol. Returns the reload to issue, or `None` when nothing changed.
    pub fn set_symbol(&mut self, raw: &str, chat: &mut ChatTimeline) -> Option<LoadTicket> {
        let symbol = normalize_symbol(raw)?;
        if symbol == self.view.symbol {
            return None;
        }

        #[cfg(debug_assertions)]
        if PRINT_UI_INTERACTIONS {
            log::info!("[view] symbol {} -> {}", self.view.symbol, symbol);
        }

        self.view.symbol = symbol;
        self.latest_forecast = None;
        chat.append_system(format!(
            "Switched context to {}. Loading historical volatility tokens...",
            self.view.symbol
        ));
        Some(self.bump())
    }

    /// Switch timeframe. Chat is untouched.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> Option<LoadTicket> {
        if timeframe == self.view.timeframe {
            return None;
        }

        #[cfg(debug_assertions)]
        if PRINT_UI_INTERACTIONS {
            log::info!("[view] timeframe {} -> {}", self.view.timeframe, timeframe);
        }

        self.view.timeframe = timeframe;
        Some(self.bump())
    }

    /// Switch session: park the outgoing chat, load the incoming one wholesale.
    /// Market data is unaffected, so the generation stays put.
    pub fn select_session(
        &mut self,
        id: &str,
        chat: &mut ChatTimeline,
        sessions: &mut SessionDirectory,
    ) -> bool {
        let id = id.trim();
        if id.is_empty() || id == self.view.session_id {
            return false;
        }

        #[cfg(debug_assertions)]
        if PRINT_UI_INTERACTIONS {
            log::info!("[view] session {} -> {}", self.view.session_id, id);
        }

        let incoming = sessions.take_history(id, &self.view.symbol);
        let outgoing = chat.reset(incoming);
        sessions.store_history(&self.view.session_id, outgoing);
        sessions.activate(id);
        self.view.session_id = id.to_string();
        true
    }

    /// Completion handler for a market-data reload.
    pub fn apply_load_result(&mut self, generation: Generation, payload: LoadPayload) -> ApplyOutcome {
        if generation != self.view.generation {
            self.log_stale("market data", generation);
            return ApplyOutcome::Stale;
        }

        match payload {
            Ok(candles) => {
                self.regime = VolatilityRegime::classify(&candles);
                self.candles = Arc::new(candles);
                self.last_error = None;
            }
            Err(err) => {
                log::error!(
                    "Market data for {} ({}) failed: {}",
                    self.view.symbol,
                    self.view.timeframe,
                    err
                );
                self.candles = Arc::new(Vec::new());
                self.regime = VolatilityRegime::default();
                self.last_error = Some(err.to_string());
            }
        }
        self.is_loading = false;
        ApplyOutcome::Applied
    }

    /// Record a forecast for the chart header when it still matches the view.
    pub fn apply_forecast(&mut self, generation: Generation, forecast: &Forecast) -> ApplyOutcome {
        if generation != self.view.generation || forecast.symbol != self.view.symbol {
            self.log_stale("forecast", generation);
            return ApplyOutcome::Stale;
        }
        self.latest_forecast = Some(forecast.clone());
        ApplyOutcome::Applied
    }

    pub fn snapshot(&self, chat: &ChatTimeline, sessions: &SessionDirectory) -> ViewSnapshot {
        ViewSnapshot {
            symbol: self.view.symbol.clone(),
            timeframe: self.view.timeframe,
            session_id: self.view.session_id.clone(),
            generation: self.view.generation,
            candles: Arc::clone(&self.candles),
            regime: self.regime,
            latest_forecast: self.latest_forecast.clone(),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            is_agent_typing: chat.is_agent_typing(),
            sessions: sessions.sessions().to_vec(),
            events: chat.events().to_vec(),
        }
    }

    fn bump(&mut self) -> LoadTicket {
        self.view.generation += 1;
        self.is_loading = true;
        self.ticket()
    }

    fn ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.view.generation,
            symbol: self.view.symbol.clone(),
            timeframe: self.view.timeframe,
        }
    }

    fn log_stale(&self, what: &str, generation: Generation) {
        if PRINT_STALE_DISCARDS {
            log::info!(
                "Discarding stale {} (generation {} < current {})",
                what,
                generation,
                self.view.generation
            );
        } else {
            log::debug!(
                "Discarding stale {} (generation {} < current {})",
                what,
                generation,
                self.view.generation
            );
        }
    }
}
