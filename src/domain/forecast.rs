use serde::{Deserialize, Serialize};

/// Symbolic prediction emitted by the forecast engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[allow(non_camel_case_types)]
pub enum PredictionToken {
    P_SURGE_V_HIGH,
    P_SURGE_MED,
    P_CRASH_V_HIGH,
    P_CRASH_MED,
    P_STABLE,
    P_VOL_SPIKE,
}

impl PredictionToken {
    /// Token used when no real prediction is available.
    pub const NEUTRAL: PredictionToken = PredictionToken::P_STABLE;

    /// Market direction the token implies.
    pub fn direction(self) -> &'static str {
        match self {
            PredictionToken::P_SURGE_V_HIGH | PredictionToken::P_SURGE_MED => "bullish",
            PredictionToken::P_CRASH_V_HIGH | PredictionToken::P_CRASH_MED => "bearish",
            PredictionToken::P_STABLE | PredictionToken::P_VOL_SPIKE => "neutral",
        }
    }
}

/// Typed forecast, either real or degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub symbol: String,
    pub prediction_token: PredictionToken,
    /// Always within [0, 1]
    pub confidence: f64,
    pub history_used: String,
}

impl Forecast {
    /// Renderable stand-in for a forecast that could not be produced.
    pub fn degraded(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            prediction_token: PredictionToken::NEUTRAL,
            confidence: 0.0,
            history_used: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence == 0.0 && self.history_used.starts_with("Error")
    }

    /// One-line chat rendering of the forecast card.
    pub fn summary_line(&self) -> String {
        format!(
            "{} → {} [{}] (conf {:.0}%, {})",
            self.symbol,
            self.prediction_token,
            self.prediction_token.direction(),
            self.confidence * 100.0,
            self.history_used
        )
    }
}

/// Forecast job payload as the worker returns it.
///
/// Older engines send the token under `prediction` and omit `confidence`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub symbol: Option<String>,
    #[serde(alias = "prediction")]
    pub prediction_token: PredictionToken,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub history_used: Option<String>,
}

impl ForecastPayload {
    pub fn into_forecast(self, requested_symbol: &str) -> Forecast {
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Forecast {
            symbol: self
                .symbol
                .unwrap_or_else(|| requested_symbol.to_string()),
            prediction_token: self.prediction_token,
            confidence,
            history_used: self.history_used.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_prediction_key_is_accepted() {
        let value = serde_json::json!({
            "symbol": "MSFT",
            "prediction": "P_CRASH_MED",
            "history_used": "60 Days (Symbolized)"
        });
        let payload: ForecastPayload = serde_json::from_value(value).unwrap();
        let forecast = payload.into_forecast("MSFT");
        assert_eq!(forecast.prediction_token, PredictionToken::P_CRASH_MED);
        assert_eq!(forecast.confidence, 0.0);
        assert_eq!(forecast.prediction_token.direction(), "bearish");
    }

    #[test]
    fn confidence_is_clamped_and_symbol_defaults() {
        let value = serde_json::json!({ "prediction_token": "P_SURGE_MED", "confidence": 1.7 });
        let payload: ForecastPayload = serde_json::from_value(value).unwrap();
        let forecast = payload.into_forecast("AAPL");
        assert_eq!(forecast.symbol, "AAPL");
        assert_eq!(forecast.confidence, 1.0);
    }

    #[test]
    fn degraded_forecast_is_neutral() {
        let forecast = Forecast::degraded("TSLA", "Error: Timeout or Service Down");
        assert_eq!(forecast.prediction_token, PredictionToken::P_STABLE);
        assert!(forecast.is_degraded());
        assert!(forecast.summary_line().contains("[neutral]"));
    }
}
