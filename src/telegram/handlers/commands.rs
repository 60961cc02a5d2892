//! Command endpoints: /start, /help, /cancel, /formats

use fluent_templates::fluent_bundle::{FluentArgs, FluentValue};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::{ensure_access, HandlerDeps};
use crate::core::error::AppResult;
use crate::core::utils::format_size_mb;
use crate::download::FormatDescriptor;
use crate::i18n;

/// How many format entries /formats renders at most.
const FORMATS_LIMIT: usize = 20;

fn reply_lang(msg: &Message) -> unic_langid::LanguageIdentifier {
    i18n::lang_for(msg.from.as_ref().and_then(|u| u.language_code.as_deref()))
}

/// /start: gate first, then the welcome message.
pub async fn handle_start(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let lang = reply_lang(msg);
    let user_id = msg.from.as_ref().map(|u| u.id);

    if !ensure_access(bot, msg.chat.id, user_id, &lang, deps).await? {
        return Ok(());
    }

    bot.send_message(msg.chat.id, i18n::t(&lang, "welcome")).await?;
    Ok(())
}

/// /help
pub async fn handle_help(bot: &Bot, msg: &Message) -> AppResult<()> {
    let lang = reply_lang(msg);
    bot.send_message(msg.chat.id, i18n::t(&lang, "help")).await?;
    Ok(())
}

/// /cancel: clears the session unconditionally, from any state.
pub async fn handle_cancel(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let lang = reply_lang(msg);
    deps.sessions.clear(msg.chat.id);
    bot.send_message(msg.chat.id, i18n::t(&lang, "operation-cancelled")).await?;
    Ok(())
}

/// /formats: lists remote formats for the stored URL.
pub async fn handle_formats(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let lang = reply_lang(msg);
    let user_id = msg.from.as_ref().map(|u| u.id);

    if !ensure_access(bot, msg.chat.id, user_id, &lang, deps).await? {
        return Ok(());
    }

    let url = deps.sessions.get(msg.chat.id).and_then(|s| s.last_url);
    let Some(url) = url else {
        bot.send_message(msg.chat.id, i18n::t(&lang, "no-url-saved")).await?;
        return Ok(());
    };

    let status = bot
        .send_message(msg.chat.id, i18n::t(&lang, "extracting-info"))
        .await?;

    match deps.engine.list_formats(&url).await {
        None => {
            bot.edit_message_text(msg.chat.id, status.id, i18n::t(&lang, "formats-error"))
                .await?;
        }
        Some(formats) => {
            let mut args = FluentArgs::new();
            args.set("formats", FluentValue::from(format_formats_list(&formats)));
            bot.edit_message_text(msg.chat.id, status.id, i18n::t_args(&lang, "formats-available", &args))
                .await?;
        }
    }
    Ok(())
}

/// Renders the first [`FORMATS_LIMIT`] descriptors, one per line:
/// `index. formatId - ext - resolution (sizeMB|Unknown)`.
pub fn format_formats_list(formats: &[FormatDescriptor]) -> String {
    formats
        .iter()
        .take(FORMATS_LIMIT)
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{}. {} - {} - {} ({})",
                i + 1,
                f.format_id,
                f.ext,
                f.resolution,
                format_size_mb(f.filesize)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
