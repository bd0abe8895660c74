//! Exported state of a first-order text chain.
//!
//! `ChainState` is the persistence form of a text model: every context, every
//! successor observed after it, and how often. Start and end markers are
//! explicit enum variants rather than sentinel strings, so no word a user types
//! can ever be confused with them. On the wire a marker is `null`:
//!
//! ```json
//! { "version": 1, "entries": [ { "context": null, "successors": [["the", 2]] } ] }
//! ```

use serde::{Deserialize, Serialize};

/// Current `ChainState` format version.
pub const CHAIN_STATE_VERSION: u32 = 1;

/// The token a prediction is conditioned on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Context {
    /// Implicit context before the first word of a sample.
    Start,
    Word(String),
}

impl From<Option<String>> for Context {
    fn from(value: Option<String>) -> Self {
        value.map_or(Context::Start, Context::Word)
    }
}

impl From<Context> for Option<String> {
    fn from(value: Context) -> Self {
        match value {
            Context::Start => None,
            Context::Word(w) => Some(w),
        }
    }
}

/// A token observed after a context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Successor {
    Word(String),
    /// Implicit successor after the last word of a sample.
    End,
}

impl From<Option<String>> for Successor {
    fn from(value: Option<String>) -> Self {
        value.map_or(Successor::End, Successor::Word)
    }
}

impl From<Successor> for Option<String> {
    fn from(value: Successor) -> Self {
        match value {
            Successor::Word(w) => Some(w),
            Successor::End => None,
        }
    }
}

/// One context and its weighted successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub context: Context,
    pub successors: Vec<(Successor, u64)>,
}

/// Serializable snapshot of a text model's full transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<ContextEntry>,
}

fn default_version() -> u32 {
    CHAIN_STATE_VERSION
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            version: CHAIN_STATE_VERSION,
            entries: Vec::new(),
        }
    }
}

impl ChainState {
    /// Number of distinct contexts (the start marker included).
    pub fn context_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all transition counts.
    pub fn transition_count(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|e| e.successors.iter().map(|(_, n)| *n))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.successors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_serialize_as_null() {
        let state = ChainState {
            version: CHAIN_STATE_VERSION,
            entries: vec![
                ContextEntry {
                    context: Context::Start,
                    successors: vec![(Successor::Word("hi".to_string()), 2)],
                },
                ContextEntry {
                    context: Context::Word("hi".to_string()),
                    successors: vec![(Successor::End, 2)],
                },
            ],
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "entries": [
                    { "context": null, "successors": [["hi", 2]] },
                    { "context": "hi", "successors": [[null, 2]] }
                ]
            })
        );
        assert_eq!(state.context_count(), 2);
        assert_eq!(state.transition_count(), 4);
    }

    #[test]
    fn test_marker_lookalike_word_stays_a_word() {
        let json = serde_json::json!({
            "entries": [{ "context": "null", "successors": [["<end>", 1]] }]
        });
        let state: ChainState = serde_json::from_value(json).unwrap();
        assert_eq!(state.version, CHAIN_STATE_VERSION);
        assert_eq!(state.entries[0].context, Context::Word("null".to_string()));
        assert_eq!(
            state.entries[0].successors[0].0,
            Successor::Word("<end>".to_string())
        );
    }

    #[test]
    fn test_default_is_empty() {
        let state = ChainState::default();
        assert!(state.is_empty());
        assert_eq!(state.transition_count(), 0);
    }
}
