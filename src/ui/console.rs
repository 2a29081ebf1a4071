//! Plain-text rendering of the dashboard for the terminal driver.

use crate::domain::Candle;
use crate::ui::chat::{ChatEvent, EventKind, Role};
use crate::ui::view_state::ViewSnapshot;

pub const HELP_TEXT: &str =
    "Commands: /symbol <SYM>, /timeframe <1D|1W|1Y>, /session <ID>, /forecast, /quit. Anything else is sent to the agent.";

pub fn format_event(event: &ChatEvent) -> String {
    let time = event.timestamp.format("%H:%M:%S");
    match (event.kind, event.role) {
        (EventKind::Placeholder, _) => format!("[{}] scribe is thinking...", time),
        (EventKind::System, _) => format!("[{}] -- {}", time, event.content),
        (EventKind::Message, Role::User) => format!("[{}] you: {}", time, event.content),
        (EventKind::Message, Role::Agent) => match event.forecast_summary() {
            Some(forecast) => format!(
                "[{}] scribe: {}\n           {}",
                time,
                event.content,
                forecast.summary_line()
            ),
            None => format!("[{}] scribe: {}", time, event.content),
        },
    }
}

/// One-line chart header.
pub fn format_status(snapshot: &ViewSnapshot) -> String {
    let mut line = format!(
        "{} {} | session {} | regime {}",
        snapshot.symbol, snapshot.timeframe, snapshot.session_id, snapshot.regime
    );

    if snapshot.is_loading {
        line.push_str(" | loading...");
    } else if let Some(err) = &snapshot.last_error {
        line.push_str(&format!(" | no data ({})", err));
    } else {
        line.push_str(&format!(" | {}", price_range(&snapshot.candles)));
    }

    if let Some(forecast) = &snapshot.latest_forecast {
        line.push_str(&format!(" | {}", forecast.summary_line()));
    }
    line
}

fn price_range(candles: &[Candle]) -> String {
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        return "no candles".to_string();
    };
    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    format!(
        "{} candles {}..{} close {:.2} (range {:.2}-{:.2})",
        candles.len(),
        first.time,
        last.time,
        last.close,
        low,
        high
    )
}
