//! Name-based addressing predicates.
//!
//! All matching is case-insensitive and done on lower-cased copies of both the
//! text and the names.

/// The names the bot answers to.
#[derive(Debug, Clone)]
pub struct AddressBook {
    names: Vec<String>,
}

impl AddressBook {
    pub fn new(bot_name: &str, aliases: &[String]) -> Self {
        let names = std::iter::once(bot_name)
            .chain(aliases.iter().map(String::as_str))
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// True when `text` opens by addressing the bot: `@?name[:,]?` followed by
    /// whitespace or the end of the text.
    pub fn is_addressed_to_bot(&self, text: &str) -> bool {
        self.strip_address(text).is_some()
    }

    /// The remainder of `text` after the bot's name, or `None` when `text` is
    /// not addressed to the bot.
    pub fn strip_address<'a>(&self, text: &'a str) -> Option<&'a str> {
        let text = text.trim_start();
        let text = text.strip_prefix('@').unwrap_or(text);
        self.names.iter().find_map(|name| {
            let len = text
                .char_indices()
                .nth(name.chars().count())
                .map_or(text.len(), |(i, _)| i);
            if text[..len].to_lowercase() != *name {
                return None;
            }
            let after = &text[len..];
            let after = after
                .strip_prefix(':')
                .or_else(|| after.strip_prefix(','))
                .unwrap_or(after);
            (after.is_empty() || after.starts_with(char::is_whitespace)).then(|| after.trim())
        })
    }

    /// True when `name` is one of the bot's names or aliases.
    pub fn is_bot_name(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.names.iter().any(|n| *n == name)
    }
}

/// True when `text` mentions `name` as a whole word (optionally `@`-prefixed).
pub fn mentions(text: &str, name: &str) -> bool {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();

    haystack.match_indices(&needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        before.is_none_or(|c| !c.is_alphanumeric())
            && after.is_none_or(|c| !c.is_alphanumeric())
    })
}
