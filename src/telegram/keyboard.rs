//! Inline keyboards and callback payloads.
//!
//! Callback data is prefix-tagged (`fmt:` for tier picks, `gate:` for the
//! membership re-check) and round-trips through [`CallbackAction`] so the
//! handlers never string-match payloads themselves.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use unic_langid::LanguageIdentifier;

use crate::download::QualityTier;
use crate::i18n;

/// Everything an inline button of ours can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Tier(QualityTier),
    Recheck,
}

impl CallbackAction {
    /// The opaque token carried in the button.
    pub fn as_data(self) -> &'static str {
        match self {
            CallbackAction::Tier(QualityTier::Best) => "fmt:best",
            CallbackAction::Tier(QualityTier::Medium720) => "fmt:720",
            CallbackAction::Tier(QualityTier::Low360) => "fmt:360",
            CallbackAction::Tier(QualityTier::AudioOnly) => "fmt:audio",
            CallbackAction::Recheck => "gate:recheck",
        }
    }

    /// Parses an incoming payload; `None` for anything we didn't emit.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "fmt:best" => Some(CallbackAction::Tier(QualityTier::Best)),
            "fmt:720" => Some(CallbackAction::Tier(QualityTier::Medium720)),
            "fmt:360" => Some(CallbackAction::Tier(QualityTier::Low360)),
            "fmt:audio" => Some(CallbackAction::Tier(QualityTier::AudioOnly)),
            "gate:recheck" => Some(CallbackAction::Recheck),
            _ => None,
        }
    }
}

/// The four tier buttons offered after extraction, one per row.
pub fn tier_keyboard(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    let rows = [
        ("tier-best", QualityTier::Best),
        ("tier-medium", QualityTier::Medium720),
        ("tier-low", QualityTier::Low360),
        ("tier-audio", QualityTier::AudioOnly),
    ]
    .into_iter()
    .map(|(key, tier)| {
        vec![InlineKeyboardButton::callback(
            i18n::t(lang, key),
            CallbackAction::Tier(tier).as_data(),
        )]
    })
    .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}
