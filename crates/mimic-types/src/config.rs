//! Configuration types for Mimic.
//!
//! `ImpersonateConfig` is read once at startup and is immutable afterwards.
//! Raw values arrive as strings (from `config.toml` or `MIMIC_*` environment
//! variables) and are validated key by key: a bad value never prevents startup,
//! it falls back to the documented default and is reported as a
//! [`ConfigFallback`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const KEY_MODE: &str = "mode";
pub const KEY_MIN_WORDS: &str = "min_words";
pub const KEY_INIT_TIMEOUT_MS: &str = "init_timeout_ms";
pub const KEY_CASE_SENSITIVE: &str = "case_sensitive";
pub const KEY_STRIP_PUNCTUATION: &str = "strip_punctuation";
pub const KEY_RESPONSE_DELAY_PER_WORD_MS: &str = "response_delay_per_word_ms";
pub const KEY_FREQUENCY_THRESHOLD: &str = "frequency_threshold";
pub const KEY_SIMULATE_TYPING: &str = "simulate_typing";
pub const KEY_MODEL_CACHE_CAPACITY: &str = "model_cache_capacity";
pub const KEY_BOT_NAME: &str = "bot_name";
pub const KEY_BOT_ALIASES: &str = "bot_aliases";

/// Every key understood by [`ImpersonateConfig::from_raw`].
pub const CONFIG_KEYS: &[&str] = &[
    KEY_MODE,
    KEY_MIN_WORDS,
    KEY_INIT_TIMEOUT_MS,
    KEY_CASE_SENSITIVE,
    KEY_STRIP_PUNCTUATION,
    KEY_RESPONSE_DELAY_PER_WORD_MS,
    KEY_FREQUENCY_THRESHOLD,
    KEY_SIMULATE_TYPING,
    KEY_MODEL_CACHE_CAPACITY,
    KEY_BOT_NAME,
    KEY_BOT_ALIASES,
];

/// Which halves of the pipeline are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Learn from messages, never generate.
    Train,
    /// Learn from messages and generate replies while impersonating.
    TrainRespond,
    /// Generate from existing models only.
    Respond,
}

impl Mode {
    /// Whether inbound messages are used as training samples.
    pub fn trains(&self) -> bool {
        matches!(self, Mode::Train | Mode::TrainRespond)
    }

    /// Whether the bot may impersonate and generate replies.
    pub fn responds(&self) -> bool {
        matches!(self, Mode::Respond | Mode::TrainRespond)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => write!(f, "train"),
            Mode::TrainRespond => write!(f, "train_respond"),
            Mode::Respond => write!(f, "respond"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "train" => Ok(Mode::Train),
            "train_respond" | "train_and_respond" => Ok(Mode::TrainRespond),
            "respond" => Ok(Mode::Respond),
            other => Err(format!(
                "unknown mode '{other}' (expected train, train_respond or respond)"
            )),
        }
    }
}

/// Runtime configuration for the impersonation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpersonateConfig {
    pub mode: Mode,
    /// Training samples with fewer words than this are ignored.
    pub min_words: usize,
    /// How long startup waits for the data store before giving up.
    pub init_timeout_ms: u64,
    pub case_sensitive: bool,
    pub strip_punctuation: bool,
    /// Baseline time to "type" one word of a reply.
    pub response_delay_per_word_ms: u64,
    /// On a 0-100 scale, the random draw has to exceed this to reply unprompted.
    pub frequency_threshold: u8,
    /// When false, replies are sent immediately and the computed typing delay
    /// is only logged.
    pub simulate_typing: bool,
    /// Maximum number of per-user models kept in memory.
    pub model_cache_capacity: usize,
    pub bot_name: String,
    pub bot_aliases: Vec<String>,
}

impl Default for ImpersonateConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Train,
            min_words: 1,
            init_timeout_ms: 10_000,
            case_sensitive: false,
            strip_punctuation: false,
            response_delay_per_word_ms: 600,
            frequency_threshold: 50,
            simulate_typing: false,
            model_cache_capacity: 256,
            bot_name: "mimic".to_string(),
            bot_aliases: Vec::new(),
        }
    }
}

/// A configuration key whose raw value was rejected in favour of the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFallback {
    pub key: String,
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for ConfigFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = '{}': {}", self.key, self.raw, self.reason)
    }
}

impl ImpersonateConfig {
    /// Build a configuration from raw string values.
    ///
    /// Missing keys take their default silently. Present but invalid keys take
    /// their default and are returned in the fallback list. Unknown keys are
    /// ignored.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> (Self, Vec<ConfigFallback>) {
        let defaults = Self::default();
        let mut v = Validator {
            raw,
            fallbacks: Vec::new(),
        };

        let config = Self {
            mode: v.field(KEY_MODE, |s| s.parse::<Mode>()).unwrap_or(defaults.mode),
            min_words: v
                .field(KEY_MIN_WORDS, parse_number::<usize>)
                .unwrap_or(defaults.min_words),
            init_timeout_ms: v
                .field(KEY_INIT_TIMEOUT_MS, parse_number::<u64>)
                .unwrap_or(defaults.init_timeout_ms),
            case_sensitive: v
                .field(KEY_CASE_SENSITIVE, parse_bool)
                .unwrap_or(defaults.case_sensitive),
            strip_punctuation: v
                .field(KEY_STRIP_PUNCTUATION, parse_bool)
                .unwrap_or(defaults.strip_punctuation),
            response_delay_per_word_ms: v
                .field(KEY_RESPONSE_DELAY_PER_WORD_MS, parse_number::<u64>)
                .unwrap_or(defaults.response_delay_per_word_ms),
            frequency_threshold: v
                .field(KEY_FREQUENCY_THRESHOLD, |s| {
                    let n = parse_number::<u8>(s)?;
                    if n > 100 {
                        return Err(format!("{n} is outside 0..=100"));
                    }
                    Ok(n)
                })
                .unwrap_or(defaults.frequency_threshold),
            simulate_typing: v
                .field(KEY_SIMULATE_TYPING, parse_bool)
                .unwrap_or(defaults.simulate_typing),
            model_cache_capacity: v
                .field(KEY_MODEL_CACHE_CAPACITY, |s| match parse_number::<usize>(s)? {
                    0 => Err("capacity must be at least 1".to_string()),
                    n => Ok(n),
                })
                .unwrap_or(defaults.model_cache_capacity),
            bot_name: v
                .field(KEY_BOT_NAME, |s| {
                    let name = s.trim();
                    if name.is_empty() {
                        return Err("bot name must not be empty".to_string());
                    }
                    Ok(name.to_string())
                })
                .unwrap_or(defaults.bot_name),
            bot_aliases: v
                .field(KEY_BOT_ALIASES, |s| Ok(parse_list(s)))
                .unwrap_or(defaults.bot_aliases),
        };

        (config, v.fallbacks)
    }
}

/// Collects per-key fallbacks while a configuration is being built.
struct Validator<'a> {
    raw: &'a BTreeMap<String, String>,
    fallbacks: Vec<ConfigFallback>,
}

impl Validator<'_> {
    fn field<T>(&mut self, key: &str, parse: impl Fn(&str) -> Result<T, String>) -> Option<T> {
        let value = self.raw.get(key)?;
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                self.fallbacks.push(ConfigFallback {
                    key: key.to_string(),
                    raw: value.clone(),
                    reason,
                });
                None
            }
        }
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| format!("not a valid number: {e}"))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let (config, fallbacks) = ImpersonateConfig::from_raw(&BTreeMap::new());
        assert_eq!(config, ImpersonateConfig::default());
        assert!(fallbacks.is_empty());
        assert_eq!(config.mode, Mode::Train);
        assert_eq!(config.min_words, 1);
        assert_eq!(config.init_timeout_ms, 10_000);
        assert_eq!(config.response_delay_per_word_ms, 600);
        assert_eq!(config.frequency_threshold, 50);
        assert!(!config.simulate_typing);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, fallbacks) = ImpersonateConfig::from_raw(&raw(&[
            ("mode", "train_respond"),
            ("min_words", "3"),
            ("case_sensitive", "true"),
            ("strip_punctuation", "yes"),
            ("frequency_threshold", "100"),
            ("bot_name", " parrot "),
            ("bot_aliases", "polly, , pp"),
        ]));
        assert!(fallbacks.is_empty());
        assert_eq!(config.mode, Mode::TrainRespond);
        assert_eq!(config.min_words, 3);
        assert!(config.case_sensitive);
        assert!(config.strip_punctuation);
        assert_eq!(config.frequency_threshold, 100);
        assert_eq!(config.bot_name, "parrot");
        assert_eq!(config.bot_aliases, vec!["polly", "pp"]);
    }

    #[test]
    fn test_each_bad_key_falls_back_independently() {
        let (config, fallbacks) = ImpersonateConfig::from_raw(&raw(&[
            ("mode", "shout"),
            ("min_words", "-2"),
            ("frequency_threshold", "150"),
            ("model_cache_capacity", "0"),
            ("init_timeout_ms", "2500"),
        ]));
        assert_eq!(config.mode, Mode::Train);
        assert_eq!(config.min_words, 1);
        assert_eq!(config.frequency_threshold, 50);
        assert_eq!(config.model_cache_capacity, 256);
        // The valid key next to the bad ones is still honoured.
        assert_eq!(config.init_timeout_ms, 2500);

        let keys: Vec<&str> = fallbacks.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["mode", "min_words", "frequency_threshold", "model_cache_capacity"]
        );
        assert_eq!(fallbacks[0].raw, "shout");
    }

    #[test]
    fn test_mode_aliases_and_capabilities() {
        assert_eq!("TRAIN_AND_RESPOND".parse::<Mode>(), Ok(Mode::TrainRespond));
        assert!(Mode::Train.trains() && !Mode::Train.responds());
        assert!(!Mode::Respond.trains() && Mode::Respond.responds());
        assert!(Mode::TrainRespond.trains() && Mode::TrainRespond.responds());
        assert_eq!(Mode::TrainRespond.to_string(), "train_respond");
    }

    #[test]
    fn test_fallback_display() {
        let fallback = ConfigFallback {
            key: "min_words".to_string(),
            raw: "lots".to_string(),
            reason: "not a valid number".to_string(),
        };
        assert_eq!(fallback.to_string(), "min_words = 'lots': not a valid number");
    }
}
