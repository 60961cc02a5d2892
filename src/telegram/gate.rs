//! Channel-membership access gate.
//!
//! Commands only proceed once the user is a member of every configured
//! channel. Membership is queried through [`MembershipApi`] so the check
//! stays testable without a live bot.

use async_trait::async_trait;
use fluent_templates::fluent_bundle::{FluentArgs, FluentValue};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, Recipient, UserId};
use unic_langid::LanguageIdentifier;
use url::Url;

use crate::core::config;
use crate::core::error::AppResult;
use crate::i18n;
use crate::telegram::keyboard::CallbackAction;

/// Seam for "is this user a member of that channel?" queries.
#[async_trait]
pub trait MembershipApi: Send + Sync {
    async fn is_member(&self, channel: &str, user_id: UserId) -> AppResult<bool>;
}

#[async_trait]
impl MembershipApi for Bot {
    async fn is_member(&self, channel: &str, user_id: UserId) -> AppResult<bool> {
        let member = self.get_chat_member(channel_recipient(channel), user_id).await?;
        // Left and kicked both count as "not joined"; any present status passes.
        Ok(!(member.kind.is_left() || member.kind.is_banned()))
    }
}

/// Maps a configured channel entry to a Telegram recipient:
/// `@name` / bare `name` -> channel username, `-100...` -> numeric chat ID.
pub fn channel_recipient(channel: &str) -> Recipient {
    if let Ok(id) = channel.parse::<i64>() {
        return Recipient::Id(ChatId(id));
    }
    let username = if channel.starts_with('@') {
        channel.to_string()
    } else {
        format!("@{}", channel)
    };
    Recipient::ChannelUsername(username)
}

/// Public join link for a channel, when one can exist.
/// Numeric (private) channel IDs have no public link.
pub fn join_url(channel: &str) -> Option<Url> {
    if channel.parse::<i64>().is_ok() {
        return None;
    }
    let name = channel.trim_start_matches('@');
    Url::parse(&format!("https://t.me/{}", name)).ok()
}

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCheck {
    /// Required channels the user has not joined.
    pub missing: Vec<String>,
}

impl GateCheck {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// The channel-membership admission check.
pub struct AccessGate {
    required: Vec<String>,
}

impl AccessGate {
    pub fn new(required: Vec<String>) -> Self {
        AccessGate { required }
    }

    pub fn from_config() -> Self {
        Self::new(config::REQUIRED_CHANNELS.clone())
    }

    /// Whether any channels are configured at all.
    pub fn is_enabled(&self) -> bool {
        !self.required.is_empty()
    }

    /// Checks the user against every required channel.
    ///
    /// A channel the bot cannot query (unresolvable name, bot lacks
    /// visibility) is skipped rather than failing the whole check: a
    /// configuration typo must not lock every user out. Fail-open by
    /// choice; the skip is logged.
    pub async fn check(&self, api: &dyn MembershipApi, user_id: UserId) -> GateCheck {
        let mut missing = Vec::new();

        for channel in &self.required {
            match api.is_member(channel, user_id).await {
                Ok(true) => {}
                Ok(false) => missing.push(channel.clone()),
                Err(e) => {
                    log::warn!("membership query for {} failed, skipping channel: {}", channel, e);
                }
            }
        }

        GateCheck { missing }
    }
}

/// Join prompt keyboard: one link button per missing channel plus the
/// re-check action.
pub fn join_keyboard(missing: &[String], lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for channel in missing {
        if let Some(link) = join_url(channel) {
            let mut args = FluentArgs::new();
            args.set("channel", FluentValue::from(channel.as_str()));
            rows.push(vec![InlineKeyboardButton::url(
                i18n::t_args(lang, "join-channel-button", &args),
                link,
            )]);
        }
    }

    rows.push(vec![InlineKeyboardButton::callback(
        i18n::t(lang, "recheck-button"),
        CallbackAction::Recheck.as_data(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// In-memory membership table; channels in `failing` error on query.
    struct MockMembership {
        joined: HashSet<(String, u64)>,
        failing: HashSet<String>,
    }

    impl MockMembership {
        fn new() -> Self {
            MockMembership {
                joined: HashSet::new(),
                failing: HashSet::new(),
            }
        }

        fn join(&mut self, channel: &str, user: u64) {
            self.joined.insert((channel.to_string(), user));
        }

        fn fail_for(&mut self, channel: &str) {
            self.failing.insert(channel.to_string());
        }
    }

    #[async_trait]
    impl MembershipApi for MockMembership {
        async fn is_member(&self, channel: &str, user_id: UserId) -> AppResult<bool> {
            if self.failing.contains(channel) {
                return Err(crate::core::error::AppError::Anyhow(anyhow::anyhow!(
                    "chat not found"
                )));
            }
            Ok(self.joined.contains(&(channel.to_string(), user_id.0)))
        }
    }

    fn gate(channels: &[&str]) -> AccessGate {
        AccessGate::new(channels.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn empty_required_list_always_passes() {
        let api = MockMembership::new();
        let check = gate(&[]).check(&api, UserId(1)).await;
        assert!(check.passed());
        assert!(check.missing.is_empty());
    }

    #[tokio::test]
    async fn non_member_is_reported_missing() {
        let api = MockMembership::new();
        let check = gate(&["@test"]).check(&api, UserId(1)).await;
        assert!(!check.passed());
        assert_eq!(check.missing, vec!["@test".to_string()]);
    }

    #[tokio::test]
    async fn member_passes_after_joining() {
        let mut api = MockMembership::new();
        let g = gate(&["@test"]);

        assert!(!g.check(&api, UserId(1)).await.passed());

        api.join("@test", 1);
        assert!(g.check(&api, UserId(1)).await.passed());
    }

    #[tokio::test]
    async fn unqueryable_channel_is_skipped_not_fatal() {
        let mut api = MockMembership::new();
        api.join("@good", 1);
        api.fail_for("@broken");

        let check = gate(&["@good", "@broken"]).check(&api, UserId(1)).await;
        assert!(check.passed());
    }

    #[test]
    fn join_urls_come_from_usernames_only() {
        assert_eq!(join_url("@test").unwrap().as_str(), "https://t.me/test");
        assert_eq!(join_url("test").unwrap().as_str(), "https://t.me/test");
        assert!(join_url("-1001234567890").is_none());
    }

    #[test]
    fn recipients_for_usernames_and_ids() {
        assert!(matches!(
            channel_recipient("@news"),
            Recipient::ChannelUsername(ref u) if u == "@news"
        ));
        assert!(matches!(
            channel_recipient("news"),
            Recipient::ChannelUsername(ref u) if u == "@news"
        ));
        assert!(matches!(
            channel_recipient("-1001234567890"),
            Recipient::Id(ChatId(-1001234567890))
        ));
    }

    #[test]
    fn join_keyboard_lists_channels_and_recheck() {
        let lang = crate::i18n::lang_from_code("en");
        let keyboard = join_keyboard(&["@test".to_string()], &lang);

        // One join row plus the re-check row
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        let join_button = &keyboard.inline_keyboard[0][0];
        assert!(join_button.text.contains("@test"));
    }
}
