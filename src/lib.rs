//! vidgrab - Telegram bot for downloading video and audio from the web
//!
//! A user sends a link; the bot extracts metadata via yt-dlp, offers four
//! quality tiers, downloads under a 50 MB ceiling, delivers the file, and
//! cleans up after itself. An optional channel-membership gate guards the
//! whole flow.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, formatting helpers
//! - `download`: yt-dlp adapter, selector chains, artifact lifecycle
//! - `session`: per-user conversational state with TTL eviction
//! - `telegram`: bot setup, dispatcher handlers, gate, delivery
//! - `i18n`: fluent-based localization

pub mod cli;
pub mod core;
pub mod download;
pub mod i18n;
pub mod session;
pub mod telegram;

// Re-export commonly used types for convenience
pub use self::core::{config, AppError, AppResult};
pub use download::{MediaEngine, QualityTier, YtDlpEngine};
pub use session::SessionStore;
pub use telegram::{schema, AccessGate, HandlerDeps};
