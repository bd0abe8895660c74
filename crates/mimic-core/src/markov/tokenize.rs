//! Word tokenizer shared by training and seed matching.

/// How raw text is normalised into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizerOptions {
    /// Keep the original case of words. When false, tokens are lower-cased.
    pub case_sensitive: bool,
    /// Drop every character that is neither alphanumeric nor whitespace.
    pub strip_punctuation: bool,
}

/// Split `text` into normalised word tokens.
///
/// Tokens that end up empty after punctuation stripping (e.g. a lone `--`)
/// are dropped rather than kept as empty words.
pub fn tokenize(text: &str, options: TokenizerOptions) -> Vec<String> {
    text.split_whitespace()
        .map(|word| normalize(word, options))
        .filter(|word| !word.is_empty())
        .collect()
}

fn normalize(word: &str, options: TokenizerOptions) -> String {
    let word: String = if options.strip_punctuation {
        word.chars().filter(|c| c.is_alphanumeric()).collect()
    } else {
        word.to_string()
    };

    if options.case_sensitive {
        word
    } else {
        word.to_lowercase()
    }
}
