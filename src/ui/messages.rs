use crate::data::TransportError;
use crate::domain::{Forecast, Timeframe};
use crate::ui::chat::EventId;
use crate::ui::view_state::{Generation, LoadPayload};

/// Completions sent back to the app by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    MarketData {
        generation: Generation,
        symbol: String,
        timeframe: Timeframe,
        payload: LoadPayload,
    },
    Forecast {
        generation: Generation,
        placeholder: EventId,
        forecast: Forecast,
    },
    ChatReply {
        placeholder: EventId,
        reply: Result<Option<String>, TransportError>,
    },
}
