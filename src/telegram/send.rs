//! Artifact delivery over the Telegram transport.
//!
//! Sending returns a discriminated [`SendOutcome`] instead of a bare error:
//! the platform's own size rejection (its upload ceiling and our configured
//! ceiling can diverge) is distinguished from other transport failures in
//! exactly one place.

use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::RequestError;

use crate::download::{DownloadArtifact, MediaKind};

/// What became of a delivery attempt.
#[derive(Debug)]
pub enum SendOutcome {
    /// The platform accepted the file.
    Sent,
    /// The platform refused the file for its size.
    TooLarge,
    /// Any other transport failure.
    Failed(RequestError),
}

/// Dispatches the artifact as audio or video with the title attached.
pub async fn deliver(bot: &Bot, chat_id: ChatId, artifact: &DownloadArtifact, title: &str) -> SendOutcome {
    let input = InputFile::file(artifact.path.clone());

    let result = match artifact.kind {
        MediaKind::Audio => bot
            .send_audio(chat_id, input)
            .title(title.to_string())
            .await
            .map(|_| ()),
        MediaKind::Video => bot
            .send_video(chat_id, input)
            .caption(title.to_string())
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => SendOutcome::Sent,
        Err(e) if is_size_rejection(&e) => SendOutcome::TooLarge,
        Err(e) => SendOutcome::Failed(e),
    }
}

/// The transport library has no dedicated variant for Telegram's 413
/// "Request Entity Too Large" response, so the unavoidable message-text
/// inspection lives here and nowhere else.
fn is_size_rejection(err: &RequestError) -> bool {
    let text = match err {
        RequestError::Api(api) => api.to_string(),
        other => other.to_string(),
    };
    let lower = text.to_lowercase();
    lower.contains("request entity too large") || lower.contains("file is too big") || lower.contains("too large")
}
