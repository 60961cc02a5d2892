//! Extraction/download adapter over the external yt-dlp engine.
//!
//! Everything the engine can fail at (unsupported site, dead link,
//! network trouble, oversized result) collapses to `None` here. Callers
//! get an absence signal; the detail goes to the logs.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

use crate::core::config;
use crate::core::config::download::{MAX_FILE_SIZE_BYTES, USER_AGENT};
use crate::download::artifact::{cleanup_files, DownloadArtifact, MediaKind};
use crate::download::error::DownloadError;
use crate::download::options::EngineOptions;
use crate::download::selector::QualityTier;

/// Metadata the engine reports for a URL without downloading.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Duration in seconds; absent for images and livestreams.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

impl MediaInfo {
    /// Duration rounded down to whole seconds; `None` when absent or zero.
    pub fn duration_secs(&self) -> Option<u64> {
        match self.duration {
            Some(d) if d >= 1.0 => Some(d as u64),
            _ => None,
        }
    }
}

/// One remote format as the engine enumerates it. Raw decoding type;
/// converted to [`FormatDescriptor`] before leaving the adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub format_note: Option<String>,
}

/// One enumerated remote format, ready for display. Sizes are exact or
/// approximate as reported, never fabricated; `None` means unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    pub filesize: Option<u64>,
    pub vcodec: String,
    pub acodec: String,
    pub format_note: String,
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        let filesize = raw
            .filesize
            .or(raw.filesize_approx)
            .filter(|s| *s > 0.0)
            .map(|s| s as u64);

        FormatDescriptor {
            format_id: raw.format_id.unwrap_or_default(),
            ext: raw.ext.unwrap_or_default(),
            resolution: raw.resolution.unwrap_or_else(|| "audio only".to_string()),
            filesize,
            vcodec: raw.vcodec.unwrap_or_else(|| "none".to_string()),
            acodec: raw.acodec.unwrap_or_else(|| "none".to_string()),
            format_note: raw.format_note.unwrap_or_default(),
        }
    }
}

/// The media-extraction seam the conversation handlers talk to.
///
/// Implemented by [`YtDlpEngine`] in production and by in-memory mocks in
/// tests.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Fetches title/duration/formats without downloading.
    /// `None` on any extraction failure.
    async fn extract_info(&self, url: &Url) -> Option<MediaInfo>;

    /// Enumerates remote formats for display. `None` when extraction fails.
    async fn list_formats(&self, url: &Url) -> Option<Vec<FormatDescriptor>> {
        let info = self.extract_info(url).await?;
        Some(info.formats.into_iter().map(FormatDescriptor::from).collect())
    }

    /// Downloads `url` at `tier` and returns the admitted artifact.
    /// `None` on failure or when the result exceeds the size ceiling
    /// (in which case the file has already been deleted).
    async fn download(&self, url: &Url, tier: QualityTier) -> Option<DownloadArtifact>;
}

/// Production engine: shells out to the yt-dlp binary.
pub struct YtDlpEngine {
    download_dir: PathBuf,
}

impl YtDlpEngine {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        YtDlpEngine {
            download_dir: download_dir.into(),
        }
    }

    /// Runs the engine binary with a hard timeout.
    async fn run_engine(&self, args: &[String]) -> Result<std::process::Output, DownloadError> {
        let ytdl_bin = &*config::YTDL_BIN;
        log::debug!("engine command: {} {}", ytdl_bin, args.join(" "));

        timeout(
            config::download::ytdlp_timeout(),
            TokioCommand::new(ytdl_bin).args(args).output(),
        )
        .await
        .map_err(|_| {
            DownloadError::Timeout(format!(
                "engine timed out after {}s",
                config::download::YTDLP_TIMEOUT_SECS
            ))
        })?
        .map_err(|e| DownloadError::Process(format!("failed to run {}: {}", ytdl_bin, e)))
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn extract_info(&self, url: &Url) -> Option<MediaInfo> {
        let mut args: Vec<String> = [
            "--dump-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--no-check-certificate",
            "--user-agent",
            USER_AGENT,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(url.as_str().to_string());

        let output = match self.run_engine(&args).await {
            Ok(o) => o,
            Err(e) => {
                log::error!("extract_info({}) failed: {} [{}]", url, e, e.subcategory());
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let kind = classify_engine_error(&stderr);
            let err = DownloadError::Engine(stderr.lines().next().unwrap_or("engine failed").to_string());
            log::warn!("extract_info({}) engine error ({:?}): {}", url, kind, err);
            return None;
        }

        match serde_json::from_slice::<MediaInfo>(&output.stdout) {
            Ok(info) => {
                log::info!("extracted '{}' ({}s) from {}", info.title, info.duration.unwrap_or(0.0), url);
                Some(info)
            }
            Err(e) => {
                log::error!("extract_info({}) returned undecodable JSON: {}", url, e);
                None
            }
        }
    }

    async fn download(&self, url: &Url, tier: QualityTier) -> Option<DownloadArtifact> {
        let opts = EngineOptions::for_tier(tier, &self.download_dir);
        let mut args = opts.to_args();
        // Print the final path (post-transcode) instead of guessing the
        // extension the engine settled on.
        args.push("--print".to_string());
        args.push("after_move:filepath".to_string());
        args.push("--no-simulate".to_string());
        args.push(url.as_str().to_string());

        let output = match self.run_engine(&args).await {
            Ok(o) => o,
            Err(e) => {
                log::error!("download({}, {:?}) failed: {} [{}]", url, tier, e, e.subcategory());
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let kind = classify_engine_error(&stderr);
            let err = DownloadError::Engine(stderr.lines().next().unwrap_or("engine failed").to_string());
            log::warn!("download({}, {:?}) engine error ({:?}): {}", url, tier, kind, err);
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = match stdout.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => PathBuf::from(line.trim()),
            None => {
                let err = DownloadError::FileNotFound("engine printed no output path".to_string());
                log::error!("download({}, {:?}): {}", url, tier, err);
                return None;
            }
        };

        admit_file(&path, tier.media_kind())
    }
}

/// Size admission: verifies the downloaded file exists and fits the
/// ceiling. Oversized files are deleted on the spot; the engine's own
/// size filters are estimates, not guarantees.
pub fn admit_file(path: &Path, kind: MediaKind) -> Option<DownloadArtifact> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            log::error!("downloaded file missing at {}: {}", path.display(), e);
            return None;
        }
    };

    if size > MAX_FILE_SIZE_BYTES {
        log::warn!(
            "rejecting {}: {} bytes exceeds ceiling of {} bytes",
            path.display(),
            size,
            MAX_FILE_SIZE_BYTES
        );
        cleanup_files(path);
        return None;
    }

    Some(DownloadArtifact {
        path: path.to_path_buf(),
        size,
        kind,
    })
}

/// Rough classification of engine stderr, for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The site or URL shape is not supported by any extractor.
    Unsupported,
    /// The video exists but cannot be served (private, removed, geo-blocked).
    Unavailable,
    /// Connectivity trouble between the engine and the site.
    Network,
    Unknown,
}

/// Buckets engine stderr into an [`EngineErrorKind`].
pub fn classify_engine_error(stderr: &str) -> EngineErrorKind {
    let lower = stderr.to_lowercase();

    if lower.contains("unsupported url") || lower.contains("is not a valid url") || lower.contains("no suitable extractor")
    {
        return EngineErrorKind::Unsupported;
    }

    if lower.contains("private video")
        || lower.contains("video unavailable")
        || lower.contains("this video is not available")
        || lower.contains("has been removed")
        || lower.contains("video is private")
    {
        return EngineErrorKind::Unavailable;
    }

    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
        || lower.contains("failed to connect")
    {
        return EngineErrorKind::Network;
    }

    EngineErrorKind::Unknown
}
