// crates/simstream-providers/src/lorem.rs
// ============================================================================
// Module: Lorem Fake-Data Provider
// Description: `faker.lorem.*` functions.
// Purpose: Produce filler text for free-form string fields.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use serde_json::Value as JsonValue;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do", "eiusmod", "tempor", "incididunt",
];

/// `faker.lorem.word` — a single random lowercase word. Ignores `params`.
#[must_use]
pub fn word(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    JsonValue::String(WORDS[rng.gen_range(0..WORDS.len())].to_string())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    #[test]
    fn word_is_one_of_the_known_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let value = word(&json!({}), &mut rng);
        assert!(WORDS.contains(&value.as_str().unwrap()));
    }
}
