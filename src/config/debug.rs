//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so the
//! console driver stays quiet unless `RUST_LOG` asks for more.

/// Emit one log line per poll attempt (status, attempt number).
pub const PRINT_POLL_TICKS: bool = false;

/// Promote stale-generation discards from `debug` to `info`.
pub const PRINT_STALE_DISCARDS: bool = false;

/// Emit UI interaction logs (symbol / timeframe / session switches).
pub const PRINT_UI_INTERACTIONS: bool = true;

/// Dump the full snapshot after every applied completion.
pub const PRINT_SNAPSHOTS: bool = false;
