//! Fatal-signal table.
//!
//! A fatal signal is an error the backend has already identified as
//! non-recoverable, so polling stops immediately instead of burning the
//! whole retry budget. Each signal has a structured code (preferred) and
//! the legacy message fragment older backends embed in plain error text.

use crate::engine::FatalSignal;

pub struct FatalSignalRule {
    pub signal: FatalSignal,
    /// Value of the `code` field in a structured error body
    pub code: &'static str,
    /// Case-insensitive fragment matched against free-form error text
    pub legacy_fragment: &'static str,
}

pub const FATAL_SIGNALS: &[FatalSignalRule] = &[
    FatalSignalRule {
        signal: FatalSignal::ColdStart,
        code: "cold_start",
        legacy_fragment: "warming up",
    },
    FatalSignalRule {
        signal: FatalSignal::UpstreamUnreachable,
        code: "upstream_unreachable",
        legacy_fragment: "unreachable",
    },
];
