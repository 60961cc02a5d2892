//! Download-flow tests against a mock media engine.
//!
//! Drives the session store and adapter contract the way the callback
//! handler does, with an engine double that counts calls and materializes
//! real files so size admission and cleanup run against the filesystem.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use teloxide::types::ChatId;
use tempfile::TempDir;
use url::Url;

use vidgrab::download::adapter::{admit_file, MediaInfo};
use vidgrab::download::{ArtifactGuard, DownloadArtifact, MediaEngine, MediaKind, QualityTier};
use vidgrab::session::SessionStore;
use vidgrab::telegram::handlers::offer_text;

/// Engine double: serves canned metadata and materializes files of a
/// configured size, then runs them through real size admission.
struct MockEngine {
    info: Option<MediaInfo>,
    file_size: u64,
    dir: TempDir,
    extract_calls: AtomicU64,
    download_calls: AtomicU64,
}

impl MockEngine {
    fn new(info: Option<MediaInfo>, file_size: u64) -> Self {
        MockEngine {
            info,
            file_size,
            dir: TempDir::new().unwrap(),
            extract_calls: AtomicU64::new(0),
            download_calls: AtomicU64::new(0),
        }
    }

    fn downloads(&self) -> u64 {
        self.download_calls.load(Ordering::Relaxed)
    }

    fn materialize(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(self.file_size).unwrap();
        path
    }
}

#[async_trait]
impl MediaEngine for MockEngine {
    async fn extract_info(&self, _url: &Url) -> Option<MediaInfo> {
        self.extract_calls.fetch_add(1, Ordering::Relaxed);
        self.info.clone()
    }

    async fn download(&self, _url: &Url, tier: QualityTier) -> Option<DownloadArtifact> {
        self.download_calls.fetch_add(1, Ordering::Relaxed);
        let name = match tier {
            QualityTier::AudioOnly => "demo01.mp3",
            _ => "demo01.mp4",
        };
        let path = self.materialize(name);
        admit_file(&path, tier.media_kind())
    }
}

fn demo_info() -> MediaInfo {
    serde_json::from_str(r#"{"id": "demo01", "title": "Demo", "duration": 125.0, "formats": []}"#).unwrap()
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// The selection step as the callback handler performs it: claim the
/// session URL, download only if one was claimed, release the claim.
async fn attempt_selection(
    engine: &MockEngine,
    sessions: &SessionStore,
    chat: ChatId,
    tier: QualityTier,
) -> Option<DownloadArtifact> {
    let (stored_url, _title) = sessions.begin_download(chat, tier)?;
    let artifact = engine.download(&stored_url, tier).await;
    sessions.finish_download(chat);
    artifact
}

#[tokio::test]
async fn selection_without_url_performs_no_download() {
    let engine = MockEngine::new(Some(demo_info()), 1024);
    let sessions = SessionStore::new();

    let result = attempt_selection(&engine, &sessions, ChatId(1), QualityTier::Best).await;

    assert!(result.is_none());
    assert_eq!(engine.downloads(), 0);
}

#[tokio::test]
async fn url_submission_offers_title_duration_and_tiers() {
    let engine = MockEngine::new(Some(demo_info()), 1024);
    let sessions = SessionStore::new();
    let chat = ChatId(10);

    let submitted = url("https://example.com/video");
    sessions.store_url(chat, submitted.clone());

    let info = engine.extract_info(&submitted).await.unwrap();
    sessions.store_title(chat, info.title.clone());

    let lang = vidgrab::i18n::lang_from_code("en");
    let offer = offer_text(&lang, &info.title, info.duration_secs());
    assert!(offer.contains("Demo"));
    assert!(offer.contains("2:05"));

    let keyboard = vidgrab::telegram::keyboard::tier_keyboard(&lang);
    assert_eq!(keyboard.inline_keyboard.len(), 4);
}

#[tokio::test]
async fn audio_selection_yields_mp3_artifact_and_cleanup_sweeps_it() {
    let engine = MockEngine::new(Some(demo_info()), 1024 * 1024);
    let sessions = SessionStore::new();
    let chat = ChatId(20);
    sessions.store_url(chat, url("https://example.com/video"));
    sessions.store_title(chat, "Demo".to_string());

    let artifact = attempt_selection(&engine, &sessions, chat, QualityTier::AudioOnly)
        .await
        .unwrap();

    assert_eq!(artifact.kind, MediaKind::Audio);
    assert_eq!(artifact.path.extension().and_then(|e| e.to_str()), Some("mp3"));

    // Delivery holds the artifact in a guard; dropping it removes the file
    // and any sidecars.
    let sidecar = artifact.path.with_extension("json");
    std::fs::write(&sidecar, b"{}").unwrap();
    let path = artifact.path.clone();
    drop(ArtifactGuard::new(artifact));

    assert!(!path.exists());
    assert!(!sidecar.exists());
}

#[tokio::test]
async fn oversized_download_is_rejected_and_url_survives_for_retry() {
    // 60 MiB result against the 50 MiB ceiling
    let engine = MockEngine::new(Some(demo_info()), 60 * 1024 * 1024);
    let sessions = SessionStore::new();
    let chat = ChatId(30);
    sessions.store_url(chat, url("https://example.com/video"));

    let result = attempt_selection(&engine, &sessions, chat, QualityTier::Best).await;

    assert!(result.is_none());
    assert_eq!(engine.downloads(), 1);
    // The oversized file was deleted by admission.
    assert!(!engine.dir.path().join("demo01.mp4").exists());

    // The session still holds the URL: the user may retry a lower tier.
    let session = sessions.get(chat).unwrap();
    assert!(session.last_url.is_some());
    assert!(session.pending_tier.is_none());

    // A retry at a lower tier goes through.
    let small_engine = MockEngine::new(Some(demo_info()), 1024);
    let retry = attempt_selection(&small_engine, &sessions, chat, QualityTier::Low360).await;
    assert!(retry.is_some());
}

#[tokio::test]
async fn extraction_failure_surfaces_as_absent() {
    let engine = MockEngine::new(None, 1024);
    assert!(engine.extract_info(&url("https://example.com/broken")).await.is_none());
    assert!(engine.list_formats(&url("https://example.com/broken")).await.is_none());
}
