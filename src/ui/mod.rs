// Dashboard state, chat timeline and the app loop driving them
pub mod app;
pub mod app_async;
pub mod chat;
pub mod console;
pub mod messages;
pub mod sessions;
pub mod view_state;

// Re-export main app
pub use app::{AppError, AppSettings, ScribeApp};
pub use view_state::{ViewSnapshot, ViewStateController};
