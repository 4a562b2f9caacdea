use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use strum::EnumString;

/// 被動觸發的關鍵字 (英文與阿拉伯文的「金」)
static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(gold|ذهب)\b").expect("Failed to compile keyword regex"));

#[derive(Debug, EnumString, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Command {
    Start,
    Help,
    Gold,
}

/// What an incoming message asks the bot to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    Command(Command),
    /// Plain text mentioning gold.
    Keyword,
}

/// Classifies a message text.
///
/// Commands are recognised with or without the `@botname` suffix Telegram
/// appends in group chats. Unknown commands are ignored, and so is free text
/// unless keyword listening is on.
pub fn classify(text: &str, keywords_enabled: bool) -> Option<Trigger> {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix('/') {
        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        return Command::from_str(name).ok().map(Trigger::Command);
    }

    if keywords_enabled && KEYWORD.is_match(text) {
        return Some(Trigger::Keyword);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(classify("/start", false), Some(Trigger::Command(Command::Start)));
        assert_eq!(classify("/help", false), Some(Trigger::Command(Command::Help)));
        assert_eq!(classify(" /gold ", false), Some(Trigger::Command(Command::Gold)));
        assert_eq!(classify("/GOLD now", false), Some(Trigger::Command(Command::Gold)));
        assert_eq!(
            classify("/gold@GoldPriceAedBot", false),
            Some(Trigger::Command(Command::Gold))
        );
        assert_eq!(classify("/silver", true), None);
        assert_eq!(classify("/", true), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(classify("what is the Gold price?", true), Some(Trigger::Keyword));
        assert_eq!(classify("كم سعر الذهب اليوم", true), None);
        assert_eq!(classify("سعر ذهب اليوم", true), Some(Trigger::Keyword));
        assert_eq!(classify("goldfish", true), None);
        assert_eq!(classify("what is the gold price?", false), None);
        assert_eq!(classify("hello", true), None);
    }
}
