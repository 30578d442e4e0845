//! Fallback cost model for sessions whose snapshot carries no authoritative
//! cost.
//!
//! The host usually reports `total_cost_usd` itself. When it doesn't (older
//! hosts, or a session that has burned tokens before the first cost update),
//! we estimate from token counts using a fixed per-model rate table. The
//! estimate is deterministic and does no I/O, so repeated invocations with
//! the same snapshot produce the same record.

/// USD per million tokens: (label substring, input rate, output rate).
/// Matched case-insensitively against the model label; first hit wins.
const TIERS: &[(&str, f64, f64)] = &[
    ("opus", 15.0, 75.0),
    ("sonnet", 3.0, 15.0),
    ("haiku", 0.8, 4.0),
];

/// Rates used when the model label matches no known tier.
const DEFAULT_RATES: (f64, f64) = (3.0, 15.0);

const TOKENS_PER_MTOK: f64 = 1_000_000.0;

/// Returns (input, output) USD-per-MTok rates for a model label.
fn rates_for(model: &str) -> (f64, f64) {
    let label = model.to_ascii_lowercase();
    for (needle, input, output) in TIERS {
        if label.contains(needle) {
            return (*input, *output);
        }
    }
    DEFAULT_RATES
}

/// Estimates session cost in USD from token counts.
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let (input_rate, output_rate) = rates_for(model);
    (input_tokens as f64 / TOKENS_PER_MTOK) * input_rate
        + (output_tokens as f64 / TOKENS_PER_MTOK) * output_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opus_one_mtok_each_way() {
        // 1M input + 1M output at 15/75 per MTok.
        assert_eq!(estimate_cost("Opus", 1_000_000, 1_000_000), 90.0);
    }

    #[test]
    fn test_estimate_is_reproducible() {
        let a = estimate_cost("claude-opus-4", 123_456, 654_321);
        let b = estimate_cost("claude-opus-4", 123_456, 654_321);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        assert_eq!(rates_for("Claude-OPUS-4-20250514"), (15.0, 75.0));
        assert_eq!(rates_for("sonnet"), (3.0, 15.0));
        assert_eq!(rates_for("claude-haiku-4-5"), (0.8, 4.0));
    }

    #[test]
    fn test_unknown_model_uses_default_tier() {
        assert_eq!(rates_for("some-future-model"), DEFAULT_RATES);
        assert_eq!(estimate_cost("some-future-model", 1_000_000, 0), 3.0);
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        assert_eq!(estimate_cost("Opus", 0, 0), 0.0);
    }
}
