use serde::{Deserialize, Serialize};

/// Chart timeframe selector.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1D")]
    #[strum(serialize = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    #[strum(serialize = "1W")]
    OneWeek,
    #[serde(rename = "1Y")]
    #[strum(serialize = "1Y")]
    OneYear,
}

impl Timeframe {
    /// Value of the `timeframe` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneYear => "1Y",
        }
    }
}
