#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use data::{HttpBackend, ScribeBackend};
pub use domain::{Candle, Forecast, Timeframe};
pub use engine::{ForecastService, JobPoller};
pub use ui::{AppSettings, ScribeApp};
pub use utils::app_time;

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (falls back to the built-in default)
    #[arg(long, env = config::BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// Ticker to open the dashboard on
    #[arg(long, default_value = config::DEFAULT_SYMBOL)]
    pub symbol: String,

    /// Chart timeframe: 1D, 1W or 1Y
    #[arg(long, default_value = "1D")]
    pub timeframe: Timeframe,

    /// Chat session to open
    #[arg(long, default_value = config::DEFAULT_SESSION_ID)]
    pub session: String,
}

impl Cli {
    pub fn settings(&self) -> AppSettings {
        AppSettings {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            session_id: self.session.clone(),
            ..AppSettings::default()
        }
    }
}

/// Build the dashboard against the HTTP backend.
/// This is the public API for the binary to call
pub fn run_app(args: &Cli) -> anyhow::Result<ScribeApp> {
    let base_url = config::resolve_base_url(args.base_url.as_deref());
    let backend = HttpBackend::new(&base_url)?;
    Ok(ScribeApp::new(std::sync::Arc::new(backend), args.settings()))
}
