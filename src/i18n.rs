use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::config;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en",
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("en", "English"), ("fa", "فارسی")];

/// Default language identifier used as a fallback.
/// Falls back to English if DEFAULT_LANG holds an unparsable code.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| {
    config::DEFAULT_LANG
        .parse()
        .unwrap_or_else(|_| "en".parse().unwrap_or_default())
});

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    normalized.parse().unwrap_or_else(|_| DEFAULT_LANG.clone())
}

/// Resolves the reply language from a Telegram user's language code.
/// Unsupported or missing codes fall back to the configured default.
pub fn lang_for(telegram_lang_code: Option<&str>) -> LanguageIdentifier {
    match telegram_lang_code.and_then(is_language_supported) {
        Some(code) => lang_from_code(code),
        None => DEFAULT_LANG.clone(),
    }
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    // Normalize the code (e.g., "en-US" -> "en", "fa-IR" -> "fa")
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();

    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let en = lang_from_code("en");
        let fa = lang_from_code("fa");

        assert_eq!(t(&en, "extracting-info"), "⏳ Fetching info...");
        assert_eq!(t(&fa, "extracting-info"), "⏳ در حال دریافت اطلاعات...");
    }

    #[test]
    fn unknown_key_returns_key_for_every_language() {
        for (code, _) in SUPPORTED_LANGS {
            let lang = lang_from_code(code);
            assert_eq!(t(&lang, "definitely-not-a-key"), "definitely-not-a-key");
        }
    }

    #[test]
    fn converts_newlines() {
        let en = lang_from_code("en");
        let text = t(&en, "welcome");

        // Should contain actual newlines, not literal \n
        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
    }

    #[test]
    fn interpolates_named_arguments() {
        let en = lang_from_code("en");
        let mut args = FluentArgs::new();
        args.set("title", FluentValue::from("Demo"));

        let text = t_args(&en, "video-title", &args);
        assert!(text.contains("Demo"));
    }

    #[test]
    fn test_is_language_supported() {
        assert_eq!(is_language_supported("en"), Some("en"));
        assert_eq!(is_language_supported("fa"), Some("fa"));

        // Variants normalize to the base language
        assert_eq!(is_language_supported("en-US"), Some("en"));
        assert_eq!(is_language_supported("fa-IR"), Some("fa"));

        // Case insensitivity
        assert_eq!(is_language_supported("EN"), Some("en"));

        // Unsupported languages
        assert_eq!(is_language_supported("ru"), None);
        assert_eq!(is_language_supported("unknown"), None);
    }
}
