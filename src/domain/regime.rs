use itertools::Itertools;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::Candle;

/// Std-dev of close-to-close returns at or above which the tape is "peaking".
const PEAK_VOLATILITY: f64 = 0.03;
/// Std-dev threshold for an elevated (but not extreme) regime.
const ELEVATED_VOLATILITY: f64 = 0.018;
/// Net drift over the window that turns a calm tape into accumulation.
const ACCUMULATION_DRIFT: f64 = 0.02;

/// Volatility regime shown next to the chart.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[allow(non_camel_case_types)]
pub enum VolatilityRegime {
    V_PEAK,
    V_ELEVATED,
    #[default]
    P_STEADY,
    P_ACCUMULATION,
}

impl VolatilityRegime {
    /// Classify a close series. Series too short to measure are steady.
    pub fn classify(candles: &[Candle]) -> Self {
        let returns: Vec<f64> = candles
            .iter()
            .map(|c| c.close)
            .tuple_windows()
            .filter(|(prev, _)| *prev > 0.0)
            .map(|(prev, next)| (next - prev) / prev)
            .collect();

        if returns.len() < 2 {
            return VolatilityRegime::P_STEADY;
        }

        let volatility = returns.iter().std_dev();
        if !volatility.is_finite() {
            return VolatilityRegime::P_STEADY;
        }
        if volatility >= PEAK_VOLATILITY {
            return VolatilityRegime::V_PEAK;
        }
        if volatility >= ELEVATED_VOLATILITY {
            return VolatilityRegime::V_ELEVATED;
        }

        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) if first.close > 0.0 => (first.close, last.close),
            _ => return VolatilityRegime::P_STEADY,
        };
        if (last - first) / first >= ACCUMULATION_DRIFT {
            VolatilityRegime::P_ACCUMULATION
        } else {
            VolatilityRegime::P_STEADY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(format!("2024-01-{:02}", i + 1), c, c, c, c))
            .collect()
    }

    #[test]
    fn short_series_is_steady() {
        assert_eq!(VolatilityRegime::classify(&[]), VolatilityRegime::P_STEADY);
        assert_eq!(
            VolatilityRegime::classify(&series(&[100.0, 140.0])),
            VolatilityRegime::P_STEADY
        );
    }

    #[test]
    fn whipsaw_is_peak() {
        let candles = series(&[100.0, 110.0, 95.0, 112.0, 90.0, 108.0]);
        assert_eq!(VolatilityRegime::classify(&candles), VolatilityRegime::V_PEAK);
    }

    #[test]
    fn calm_uptrend_is_accumulation() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.3).collect();
        assert_eq!(
            VolatilityRegime::classify(&series(&closes)),
            VolatilityRegime::P_ACCUMULATION
        );
    }

    #[test]
    fn flat_tape_is_steady() {
        let closes = [100.0, 100.2, 99.9, 100.1, 100.0, 100.1];
        assert_eq!(
            VolatilityRegime::classify(&series(&closes)),
            VolatilityRegime::P_STEADY
        );
    }
}
