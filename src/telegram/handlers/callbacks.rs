//! Callback endpoint: tier selections and the membership re-check.

use fluent_templates::fluent_bundle::{FluentArgs, FluentValue};
use teloxide::prelude::*;
use teloxide::types::MessageId;
use unic_langid::LanguageIdentifier;
use url::Url;

use super::HandlerDeps;
use crate::core::error::AppResult;
use crate::download::{ArtifactGuard, MediaKind, QualityTier};
use crate::i18n;
use crate::telegram::keyboard::CallbackAction;
use crate::telegram::send::{self, SendOutcome};

/// Routes a callback press. Unknown payloads answer "invalid format"
/// without disturbing the session.
pub async fn handle_callback(bot: &Bot, q: CallbackQuery, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::lang_for(q.from.language_code.as_deref());

    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());
    let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
        // Message too old for Telegram to reference; just ack.
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    };

    let action = q.data.as_deref().and_then(CallbackAction::parse);
    match action {
        Some(CallbackAction::Recheck) => {
            let check = deps.gate.check(bot, q.from.id).await;
            if check.passed() {
                let _ = bot.answer_callback_query(q.id.clone()).await;
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "membership-verified"))
                    .await?;
            } else {
                bot.answer_callback_query(q.id.clone())
                    .text(i18n::t(&lang, "not-member-alert"))
                    .show_alert(true)
                    .await?;
            }
        }
        Some(CallbackAction::Tier(tier)) => {
            let _ = bot.answer_callback_query(q.id.clone()).await;

            match deps.sessions.begin_download(chat_id, tier) {
                None => {
                    // Session lost or never primed with a URL.
                    bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "no-url-saved"))
                        .await?;
                }
                Some((url, title)) => {
                    let result = run_tier_download(bot, chat_id, message_id, &lang, deps, &url, tier, title).await;
                    deps.sessions.finish_download(chat_id);
                    result?;
                }
            }
        }
        None => {
            log::warn!("unknown callback payload from user {}: {:?}", q.from.id, q.data);
            let _ = bot.answer_callback_query(q.id.clone()).await;
            bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "invalid-format"))
                .await?;
        }
    }
    Ok(())
}

/// Download + deliver one tier. The artifact lives in an [`ArtifactGuard`],
/// so its files are removed on every exit path out of this function,
/// including error returns from the transport edits.
#[allow(clippy::too_many_arguments)]
async fn run_tier_download(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
    url: &Url,
    tier: QualityTier,
    title: Option<String>,
) -> AppResult<()> {
    bot.edit_message_text(chat_id, message_id, i18n::t(lang, "downloading"))
        .await?;

    let Some(artifact) = deps.engine.download(url, tier).await else {
        // Nothing to clean: either no file was produced or the adapter
        // already deleted an oversized one. The URL stays in the session
        // so the user can retry a lower tier.
        bot.edit_message_text(chat_id, message_id, i18n::t(lang, "file-too-large"))
            .await?;
        return Ok(());
    };

    log::info!(
        "downloaded {} ({} bytes) for chat {}",
        artifact.path.display(),
        artifact.size,
        chat_id
    );
    let guard = ArtifactGuard::new(artifact);

    bot.edit_message_text(chat_id, message_id, i18n::t(lang, "uploading"))
        .await?;

    let caption = title.unwrap_or_else(|| match guard.artifact().kind {
        MediaKind::Audio => "Audio".to_string(),
        MediaKind::Video => String::new(),
    });

    match send::deliver(bot, chat_id, guard.artifact(), &caption).await {
        SendOutcome::Sent => {
            let _ = bot.delete_message(chat_id, message_id).await;
            bot.send_message(chat_id, i18n::t(lang, "download-complete")).await?;
        }
        SendOutcome::TooLarge => {
            // The platform's ceiling disagreed with ours; same user story.
            bot.edit_message_text(chat_id, message_id, i18n::t(lang, "file-too-large"))
                .await?;
        }
        SendOutcome::Failed(e) => {
            log::error!("delivery failed for chat {}: {}", chat_id, e);
            let mut args = FluentArgs::new();
            args.set("error", FluentValue::from(e.to_string()));
            bot.edit_message_text(chat_id, message_id, i18n::t_args(lang, "error-occurred", &args))
                .await?;
        }
    }

    // `guard` drops here: artifact and sidecar files removed exactly once.
    Ok(())
}
