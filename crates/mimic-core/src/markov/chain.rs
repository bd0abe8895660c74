//! `TextModel`: a first-order word chain with raw occurrence counts.
//!
//! Each accepted training sample contributes one count per adjacent pair in
//! `START, w1, .., wn, END`. Generation walks the chain from the start marker
//! (or from a word shared with the seed text), sampling each successor with
//! probability proportional to its count.

use std::collections::BTreeMap;

use mimic_types::config::ImpersonateConfig;
use mimic_types::model::{ChainState, ContextEntry, Context, Successor, CHAIN_STATE_VERSION};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::tokenize::{tokenize, TokenizerOptions};

/// Safety bound on the number of words in one generated response.
pub const MAX_RESPONSE_TOKENS: usize = 64;

/// Training and normalisation settings for a `TextModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOptions {
    /// Samples with fewer tokens than this are ignored.
    pub min_words: usize,
    pub tokenizer: TokenizerOptions,
}

impl ModelOptions {
    pub fn from_config(config: &ImpersonateConfig) -> Self {
        Self {
            min_words: config.min_words,
            tokenizer: TokenizerOptions {
                case_sensitive: config.case_sensitive,
                strip_punctuation: config.strip_punctuation,
            },
        }
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            min_words: 1,
            tokenizer: TokenizerOptions::default(),
        }
    }
}

/// Per-user statistical chain.
///
/// Counts only ever grow: neither training nor importing removes data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextModel {
    options: ModelOptions,
    transitions: BTreeMap<Context, BTreeMap<Successor, u64>>,
}

impl TextModel {
    /// Create an empty model.
    pub fn new(options: ModelOptions) -> Self {
        Self {
            options,
            transitions: BTreeMap::new(),
        }
    }

    /// Create a model pre-populated from exported state.
    pub fn from_state(options: ModelOptions, state: ChainState) -> Self {
        let mut model = Self::new(options);
        model.import_state(state);
        model
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    /// Learn from one message.
    ///
    /// Returns `false` (and changes nothing) when the message has fewer
    /// tokens than `min_words`, or no tokens at all.
    pub fn train(&mut self, text: &str) -> bool {
        let tokens = tokenize(text, self.options.tokenizer);
        if tokens.is_empty() || tokens.len() < self.options.min_words {
            return false;
        }

        let mut context = Context::Start;
        for token in tokens {
            self.increment(context, Successor::Word(token.clone()), 1);
            context = Context::Word(token);
        }
        self.increment(context, Successor::End, 1);
        true
    }

    /// Generate a response using the thread-local RNG.
    pub fn respond(&self, seed: &str) -> String {
        self.respond_with(seed, &mut rand::thread_rng())
    }

    /// Generate a response, biased toward a word shared with `seed`.
    ///
    /// If one or more seed tokens are known contexts, one of them is picked at
    /// random, emitted as the first word, and generation continues from it.
    /// Otherwise generation starts at the start marker. An untrained model
    /// yields an empty string.
    pub fn respond_with(&self, seed: &str, rng: &mut impl Rng) -> String {
        if self.is_empty() {
            return String::new();
        }

        let anchors: Vec<String> = tokenize(seed, self.options.tokenizer)
            .into_iter()
            .filter(|token| self.has_successors(&Context::Word(token.clone())))
            .collect();

        let mut words: Vec<String> = Vec::new();
        let mut context = match anchors.choose(rng) {
            Some(anchor) => {
                words.push(anchor.clone());
                Context::Word(anchor.clone())
            }
            None => Context::Start,
        };

        while words.len() < MAX_RESPONSE_TOKENS {
            match self.sample(&context, rng) {
                Some(Successor::Word(word)) => {
                    words.push(word.clone());
                    context = Context::Word(word);
                }
                Some(Successor::End) | None => break,
            }
        }

        words.join(" ")
    }

    /// Snapshot the full transition table.
    pub fn export_state(&self) -> ChainState {
        let entries = self
            .transitions
            .iter()
            .map(|(context, successors)| ContextEntry {
                context: context.clone(),
                successors: successors
                    .iter()
                    .map(|(successor, count)| (successor.clone(), *count))
                    .collect(),
            })
            .collect();

        ChainState {
            version: CHAIN_STATE_VERSION,
            entries,
        }
    }

    /// Merge exported state into this model.
    ///
    /// Counts are added to existing ones, so importing into an empty model
    /// reproduces the exported structure exactly. Zero counts are skipped.
    pub fn import_state(&mut self, state: ChainState) {
        for entry in state.entries {
            for (successor, count) in entry.successors {
                if count > 0 {
                    self.increment(entry.context.clone(), successor, count);
                }
            }
        }
    }

    /// True when the model has never accepted a sample.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Number of distinct contexts, the start marker included.
    pub fn context_count(&self) -> usize {
        self.transitions.len()
    }

    /// Observed successors of `context` with their counts.
    pub fn successors(&self, context: &Context) -> Option<&BTreeMap<Successor, u64>> {
        self.transitions.get(context)
    }

    fn has_successors(&self, context: &Context) -> bool {
        self.transitions
            .get(context)
            .is_some_and(|successors| !successors.is_empty())
    }

    fn increment(&mut self, context: Context, successor: Successor, by: u64) {
        let count = self
            .transitions
            .entry(context)
            .or_default()
            .entry(successor)
            .or_insert(0);
        *count = count.saturating_add(by);
    }

    fn sample(&self, context: &Context, rng: &mut impl Rng) -> Option<Successor> {
        let successors = self.transitions.get(context)?;
        let weights: Vec<u64> = successors.values().copied().collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        successors.keys().nth(dist.sample(rng)).cloned()
    }
}
