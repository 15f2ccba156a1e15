use regex::Regex;

use crate::error::AgentError;

/// Trailing "in <place>" / "for <place>". The greedy prefix makes the last
/// preposition win; the place may only hold letters, whitespace, `.`, `-`, `'`.
const TRAILING_LOCATION_PATTERN: &str = r"(?i).*\b(?:in|for)\s+([A-Za-z\s.'\-]+)$";

/// Decides which city an utterance is about.
pub trait CityResolver: Send + Sync {
    /// City named at the end of `user_text`, or `default_city` unchanged
    fn resolve(&self, user_text: &str, default_city: &str) -> String;

    /// Rewritten utterance that names the default city explicitly, when the
    /// user gave no location at all. `None` keeps the utterance as typed.
    fn location_hint(
        &self,
        user_text: &str,
        resolved_city: &str,
        default_city: &str,
    ) -> Option<String> {
        if resolved_city != default_city || mentions_word(user_text, "in") {
            return None;
        }

        let base = user_text
            .trim()
            .trim_end_matches(|c| matches!(c, '?' | '.' | '!'))
            .trim_end();
        Some(format!("{} in {}", base, default_city))
    }
}

/// Regex-based resolver for "What's the weather in X" style questions
pub struct PatternCityResolver {
    pattern: Regex,
}

impl PatternCityResolver {
    pub fn new() -> Result<Self, AgentError> {
        Ok(Self {
            pattern: Regex::new(TRAILING_LOCATION_PATTERN)?,
        })
    }
}

impl CityResolver for PatternCityResolver {
    fn resolve(&self, user_text: &str, default_city: &str) -> String {
        self.pattern
            .captures(user_text.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_city.to_string())
    }
}

fn mentions_word(text: &str, word: &str) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|token| token == word)
}
