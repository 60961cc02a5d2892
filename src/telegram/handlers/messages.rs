//! Text-message endpoint: URL submissions and everything else.

use fluent_templates::fluent_bundle::{FluentArgs, FluentValue};
use teloxide::prelude::*;
use teloxide::types::Message;
use unic_langid::LanguageIdentifier;
use url::Url;

use super::{ensure_access, HandlerDeps};
use crate::core::error::AppResult;
use crate::core::utils::format_duration;
use crate::i18n;
use crate::telegram::keyboard::tier_keyboard;

/// Entry point for non-command text. A link starts the download flow;
/// anything else gets the "send me a link" nudge without touching state.
pub async fn handle_text_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let lang = i18n::lang_for(msg.from.as_ref().and_then(|u| u.language_code.as_deref()));
    let text = msg.text().unwrap_or_default().trim();

    if !(text.starts_with("http://") || text.starts_with("https://")) {
        bot.send_message(msg.chat.id, i18n::t(&lang, "send-link")).await?;
        return Ok(());
    }

    let user_id = msg.from.as_ref().map(|u| u.id);
    if !ensure_access(bot, msg.chat.id, user_id, &lang, deps).await? {
        return Ok(());
    }

    handle_url_submission(bot, msg.chat.id, text, &lang, deps).await
}

/// URL flow: store the link, extract metadata, offer the tier keyboard.
async fn handle_url_submission(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let url = match Url::parse(text) {
        Ok(u) => u,
        Err(e) => {
            log::debug!("rejecting unparsable URL from chat {}: {}", chat_id, e);
            bot.send_message(chat_id, i18n::t(lang, "invalid-url")).await?;
            return Ok(());
        }
    };

    deps.sessions.store_url(chat_id, url.clone());

    let status = bot.send_message(chat_id, i18n::t(lang, "extracting-info")).await?;

    let Some(info) = deps.engine.extract_info(&url).await else {
        bot.edit_message_text(chat_id, status.id, i18n::t(lang, "unsupported-site"))
            .await?;
        return Ok(());
    };

    let title = if info.title.trim().is_empty() {
        "Unknown".to_string()
    } else {
        info.title.clone()
    };
    deps.sessions.store_title(chat_id, title.clone());

    bot.edit_message_text(chat_id, status.id, offer_text(lang, &title, info.duration_secs()))
        .reply_markup(tier_keyboard(lang))
        .await?;
    Ok(())
}

/// The tier-offer message: title, optional duration suffix, prompt.
/// Zero or missing duration drops the suffix entirely.
pub fn offer_text(lang: &LanguageIdentifier, title: &str, duration_secs: Option<u64>) -> String {
    let mut args = FluentArgs::new();
    args.set("title", FluentValue::from(title));
    let mut header = i18n::t_args(lang, "video-title", &args);

    if let Some(secs) = duration_secs {
        let rendered = format_duration(secs);
        if !rendered.is_empty() {
            header.push_str(&format!(" ({})", rendered));
        }
    }

    format!("{}\n\n{}", header, i18n::t(lang, "select-format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_text_includes_title_and_duration_suffix() {
        let lang = i18n::lang_from_code("en");
        let text = offer_text(&lang, "Demo", Some(125));

        assert!(text.contains("Demo"));
        assert!(text.contains("(2:05)"));
        assert!(text.contains(&i18n::t(&lang, "select-format")));
    }

    #[test]
    fn offer_text_omits_suffix_for_zero_or_absent_duration() {
        let lang = i18n::lang_from_code("en");

        assert!(!offer_text(&lang, "Live", Some(0)).contains('('));
        assert!(!offer_text(&lang, "Image", None).contains('('));
    }
}
