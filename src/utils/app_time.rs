// src/utils/app_time.rs

use chrono::{DateTime, Utc};

pub type AppInstant = std::time::Instant;

pub fn now() -> AppInstant {
    std::time::Instant::now()
}

/// Wall-clock timestamp for records that are shown to the user.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
