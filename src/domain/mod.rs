// Domain types and value objects
pub mod candle;
pub mod forecast;
pub mod regime;
pub mod symbol;
pub mod timeframe;

// Re-export commonly used types
pub use candle::Candle;
pub use forecast::{Forecast, ForecastPayload, PredictionToken};
pub use regime::VolatilityRegime;
pub use symbol::normalize_symbol;
pub use timeframe::Timeframe;
