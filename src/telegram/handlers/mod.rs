//! Dispatcher handlers: commands, URL submissions, tier selections.

mod callbacks;
mod commands;
mod messages;
mod schema;

pub use commands::format_formats_list;
pub use messages::offer_text;
pub use schema::schema;

use std::sync::Arc;

use teloxide::prelude::*;
use unic_langid::LanguageIdentifier;

use crate::core::error::AppResult;
use crate::download::MediaEngine;
use crate::i18n;
use crate::session::SessionStore;
use crate::telegram::gate::{join_keyboard, AccessGate};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: Arc<dyn MediaEngine>,
    pub sessions: Arc<SessionStore>,
    pub gate: Arc<AccessGate>,
}

impl HandlerDeps {
    pub fn new(engine: Arc<dyn MediaEngine>, sessions: Arc<SessionStore>, gate: Arc<AccessGate>) -> Self {
        HandlerDeps { engine, sessions, gate }
    }
}

/// Runs the access gate for `user_id` and, when it fails, replies with the
/// join prompt. Returns whether the caller may proceed.
pub(crate) async fn ensure_access(
    bot: &Bot,
    chat_id: ChatId,
    user_id: Option<UserId>,
    lang: &LanguageIdentifier,
    deps: &HandlerDeps,
) -> AppResult<bool> {
    if !deps.gate.is_enabled() {
        return Ok(true);
    }
    // No user attached (e.g. channel posts): nothing to check against.
    let Some(user_id) = user_id else {
        return Ok(true);
    };

    let check = deps.gate.check(bot, user_id).await;
    if check.passed() {
        return Ok(true);
    }

    log::info!("user {} gated, missing channels: {:?}", user_id, check.missing);
    bot.send_message(chat_id, i18n::t(lang, "join-channels"))
        .reply_markup(join_keyboard(&check.missing, lang))
        .await?;
    Ok(false)
}
