//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::{callbacks, commands, messages, HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Returns a handler tree usable with teloxide's Dispatcher; the same
/// schema serves production and integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callbacks = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callbacks))
}

/// Handler for bot commands (/start, /help, /cancel, /formats)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("received command {:?} from chat {}", cmd, msg.chat.id);

                let result = match cmd {
                    Command::Start => commands::handle_start(&bot, &msg, &deps).await,
                    Command::Help => commands::handle_help(&bot, &msg).await,
                    Command::Cancel => commands::handle_cancel(&bot, &msg, &deps).await,
                    Command::Formats => commands::handle_formats(&bot, &msg, &deps).await,
                };

                if let Err(e) = result {
                    log::error!("command {:?} failed for chat {}: {}", cmd, msg.chat.id, e);
                }
                Ok(())
            }
        },
    ))
}

/// Handler for regular text messages (URLs and everything else)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|t| !t.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = messages::handle_text_message(&bot, &msg, &deps).await {
                    log::error!("message handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (tier buttons, membership re-check)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let from = q.from.id;
            if let Err(e) = callbacks::handle_callback(&bot, q, &deps).await {
                log::error!("callback handler failed for user {}: {}", from, e);
            }
            Ok(())
        }
    })
}
