//! Seed session directory shown in the sidebar on first launch.

pub struct SessionSeed {
    pub id: &'static str,
    pub title: &'static str,
    /// Human-readable age shown next to the title
    pub date_label: &'static str,
}

pub const SESSIONS: &[SessionSeed] = &[
    SessionSeed {
        id: "1",
        title: "MSFT: Q3 Earnings",
        date_label: "2h ago",
    },
    SessionSeed {
        id: "2",
        title: "BTC: Halving Event",
        date_label: "1d ago",
    },
    SessionSeed {
        id: "3",
        title: "NVDA: Volatility",
        date_label: "3d ago",
    },
    SessionSeed {
        id: "4",
        title: "Macro Trends 2024",
        date_label: "1w ago",
    },
];

/// Agent note preloaded into a session's opening history.
pub struct SeedMessage {
    pub session_id: &'static str,
    pub id: &'static str,
    pub content: &'static str,
}

pub const SEED_MESSAGES: &[SeedMessage] = &[SeedMessage {
    session_id: "1",
    id: "msg-1-2",
    content: "I have detected unusual symbolic patterns on MSFT. The \"P_SURGE_V_HIGH\" token has appeared twice in the last session, indicating a potential breakout.",
}];

pub const DEFAULT_SESSION_ID: &str = "1";
pub const DEFAULT_SYMBOL: &str = "MSFT";
