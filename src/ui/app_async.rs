use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::data::TransportError;
use crate::domain::Forecast;
use crate::ui::app::ScribeApp;
use crate::ui::chat::EventId;
use crate::ui::messages::AppEvent;
use crate::ui::view_state::{Generation, LoadTicket};

/// Reports a spawned task's completion exactly once. If the task unwinds before
/// reporting, the fallback goes out instead so `in_flight` still settles.
struct Completion {
    tx: UnboundedSender<AppEvent>,
    fallback: Option<AppEvent>,
}

impl Completion {
    fn new(tx: UnboundedSender<AppEvent>, fallback: AppEvent) -> Self {
        Self {
            tx,
            fallback: Some(fallback),
        }
    }

    fn send(mut self, event: AppEvent) {
        self.fallback = None;
        // Receiver gone means the app is shutting down.
        let _ = self.tx.send(event);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(event) = self.fallback.take() {
            log::error!("Background task ended without reporting; sending fallback");
            let _ = self.tx.send(event);
        }
    }
}

impl ScribeApp {
    /// Fire a market-data load. The completion carries the ticket's generation.
    pub(super) fn spawn_market_load(&mut self, ticket: LoadTicket) {
        let backend = Arc::clone(&self.backend);
        let completion = Completion::new(
            self.event_tx.clone(),
            AppEvent::MarketData {
                generation: ticket.generation,
                symbol: ticket.symbol.clone(),
                timeframe: ticket.timeframe,
                payload: Err(TransportError::network("market data task aborted")),
            },
        );
        self.in_flight += 1;

        tokio::spawn(async move {
            let payload = backend
                .market_history(&ticket.symbol, ticket.timeframe)
                .await;
            completion.send(AppEvent::MarketData {
                generation: ticket.generation,
                symbol: ticket.symbol,
                timeframe: ticket.timeframe,
                payload,
            });
        });
    }

    pub(super) fn spawn_forecast(&mut self, generation: Generation, symbol: String, placeholder: EventId) {
        let service = self.forecasts.clone();
        let completion = Completion::new(
            self.event_tx.clone(),
            AppEvent::Forecast {
                generation,
                placeholder: placeholder.clone(),
                forecast: Forecast::degraded(symbol.clone(), "Error: Forecast Failed"),
            },
        );
        self.in_flight += 1;

        tokio::spawn(async move {
            let forecast = service.forecast(&symbol).await;
            completion.send(AppEvent::Forecast {
                generation,
                placeholder,
                forecast,
            });
        });
    }

    pub(super) fn spawn_chat(&mut self, message: String, symbol: String, placeholder: EventId) {
        let backend = Arc::clone(&self.backend);
        let completion = Completion::new(
            self.event_tx.clone(),
            AppEvent::ChatReply {
                placeholder: placeholder.clone(),
                reply: Err(TransportError::network("chat task aborted")),
            },
        );
        self.in_flight += 1;

        tokio::spawn(async move {
            let reply = backend.chat(&message, &symbol).await;
            completion.send(AppEvent::ChatReply { placeholder, reply });
        });
    }

    /// Apply every completion that is already waiting. Never blocks.
    /// Returns true while work is still in flight.
    pub fn update(&mut self) -> bool {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
        self.is_busy()
    }

    /// Wait for the next completion and apply it. `None` when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<()> {
        if !self.is_busy() {
            return None;
        }
        let event = self.event_rx.recv().await?;
        self.handle_event(event);
        Some(())
    }

    /// Drive until every spawned task has reported back.
    pub async fn settle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}
