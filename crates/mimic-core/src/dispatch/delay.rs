//! Simulated typing delay for generated replies.

use std::time::Duration;

use mimic_types::config::ImpersonateConfig;
use rand::Rng;

/// Lower bound of the jitter band around the baseline delay.
const JITTER_LOW: f64 = 0.75;
/// Upper bound (exclusive) of the jitter band around the baseline delay.
const JITTER_HIGH: f64 = 1.5;

/// How a generated reply reaches the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Send right away. The typing delay is still computed and logged, but
    /// not waited for.
    Immediate,
    /// Schedule the reply to go out after the typing delay.
    SimulateTyping,
}

impl DeliveryPolicy {
    pub fn from_config(config: &ImpersonateConfig) -> Self {
        if config.simulate_typing {
            DeliveryPolicy::SimulateTyping
        } else {
            DeliveryPolicy::Immediate
        }
    }
}

/// Time a person would plausibly take to type `word_count` words.
///
/// The baseline is `per_word * word_count`, scaled by a factor drawn uniformly
/// from `[0.75, 1.5)`.
pub fn typing_delay(word_count: usize, per_word: Duration, rng: &mut impl Rng) -> Duration {
    let words = u32::try_from(word_count).unwrap_or(u32::MAX);
    let base = per_word.saturating_mul(words);
    if base.is_zero() {
        return Duration::ZERO;
    }
    base.mul_f64(rng.gen_range(JITTER_LOW..JITTER_HIGH))
}
