//! Configuration module for the scribe dashboard core.

pub mod backend;

mod debug; // Private: callers use crate::config::PRINT_* re-exports
pub use debug::{PRINT_POLL_TICKS, PRINT_SNAPSHOTS, PRINT_STALE_DISCARDS, PRINT_UI_INTERACTIONS};

pub mod sessions;
pub mod signals;

// Re-export commonly used items
pub use backend::{BACKEND, BASE_URL_ENV, PollPolicy, resolve_base_url};
pub use sessions::{DEFAULT_SESSION_ID, DEFAULT_SYMBOL, SEED_MESSAGES, SESSIONS};
pub use signals::FATAL_SIGNALS;
