use thiserror::Error;

/// Structured error type for download operations.
///
/// Categorized variants instead of bare strings, for logging and metrics.
/// None of these reach the user directly; the adapter collapses failures
/// into an absence signal and keeps the detail for the logs.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// yt-dlp specific failures (binary not found, bad exit code, etc.)
    #[error("{0}")]
    Engine(String),

    /// Expected file not found after the engine reported success
    #[error("{0}")]
    FileNotFound(String),

    /// Download or extraction timed out
    #[error("{0}")]
    Timeout(String),

    /// Process execution failure (spawn, wait)
    #[error("{0}")]
    Process(String),

    /// Catch-all for uncategorized errors
    #[error("{0}")]
    Other(String),
}

impl DownloadError {
    /// Returns subcategory for logging
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Engine(_) => "engine",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
            DownloadError::Other(_) => "other",
        }
    }
}

/// Backwards compatibility: plain strings become `DownloadError::Other`
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        DownloadError::Other(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        DownloadError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = DownloadError::Engine("yt-dlp failed".into());
        assert_eq!(err.to_string(), "yt-dlp failed");
    }

    #[test]
    fn test_download_error_subcategory() {
        assert_eq!(DownloadError::Engine("".into()).subcategory(), "engine");
        assert_eq!(DownloadError::Timeout("".into()).subcategory(), "timeout");
        assert_eq!(DownloadError::Process("".into()).subcategory(), "process");
        assert_eq!(DownloadError::Other("".into()).subcategory(), "other");
    }

    #[test]
    fn test_from_string() {
        let err: DownloadError = "test error".to_string().into();
        assert!(matches!(err, DownloadError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }
}
