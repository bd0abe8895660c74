//! First-order word chains trained on a user's messages.
//!
//! - `tokenize` -- whitespace tokenizer with optional case folding and
//!   punctuation stripping
//! - `chain` -- `TextModel`: training, weighted generation, export/import

pub mod chain;
pub mod tokenize;

pub use chain::{ModelOptions, TextModel, MAX_RESPONSE_TOKENS};
pub use tokenize::{tokenize, TokenizerOptions};
