use serde::{Deserialize, Serialize};

/// One OHLCV bar as served by `GET /stocks/{symbol}/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar date, e.g. "2023-01-01"
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(time: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Candle {
            time: time.into(),
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_rows_decode_without_volume() {
        let raw = r#"[{"time":"2024-01-02","open":10.0,"high":12.0,"low":9.5,"close":11.0}]"#;
        let candles: Vec<Candle> = serde_json::from_str(raw).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].volume, 0.0);
        assert_eq!(candles[0], Candle::new("2024-01-02", 10.0, 12.0, 9.5, 11.0));
    }
}
