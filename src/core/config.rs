use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Download folder path
/// Read from DOWNLOAD_DIR environment variable, defaults to ./downloads
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Default language code for replies when the user's Telegram locale is
/// missing or unsupported. Read from DEFAULT_LANG environment variable.
pub static DEFAULT_LANG: Lazy<String> = Lazy::new(|| env::var("DEFAULT_LANG").unwrap_or_else(|_| "en".to_string()));

/// Channels a user must be a member of before the bot serves them.
/// Read from REQUIRED_CHANNELS as a comma-separated list of @usernames or
/// numeric chat IDs. Empty (or unset) disables the gate entirely.
pub static REQUIRED_CHANNELS: Lazy<Vec<String>> = Lazy::new(|| {
    env::var("REQUIRED_CHANNELS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
});

/// Download configuration
pub mod download {
    use super::Duration;

    /// Maximum artifact size in bytes. Telegram caps bot uploads at 50 MB,
    /// so anything larger is undeliverable and gets deleted.
    pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

    /// Cap for the separate audio stream in the best-quality selector chain.
    pub const AUDIO_STREAM_CAP_BYTES: u64 = 10 * 1024 * 1024;

    /// Timeout for yt-dlp commands (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 240; // 4 minutes, slow sites need it

    /// Browser identification sent with every engine request. Several source
    /// sites reject yt-dlp's default client string, and some present
    /// non-standard certificates, which is also why certificate checks are
    /// disabled on engine calls. Compatibility trade-off, not a security
    /// stance.
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }
}

/// Session storage configuration
pub mod session {
    use super::Duration;

    /// How long an idle session survives before eviction (in seconds)
    pub const TTL_SECS: u64 = 30 * 60;

    /// Interval between eviction sweeps (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

    /// Session time-to-live duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }

    /// Eviction sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for Telegram API requests (in seconds).
    /// Generous because file uploads ride on the same client.
    pub const TIMEOUT_SECS: u64 = 300;

    /// Telegram client timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}
