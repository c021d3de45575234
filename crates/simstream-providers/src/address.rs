// crates/simstream-providers/src/address.rs
// ============================================================================
// Module: Address Fake-Data Provider
// Description: `faker.address.*` functions.
// Purpose: Produce plausible city names for location-shaped fields.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use serde_json::Value as JsonValue;

const CITIES: &[&str] = &[
    "Gotham", "Springfield", "Rivertown", "Ashford", "Brookhaven", "Fairview", "Lakeside", "Millbrook", "Oakdale", "Westfield",
];

/// `faker.address.city` — a random city name. Ignores `params`.
#[must_use]
pub fn city(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    JsonValue::String(CITIES[rng.gen_range(0..CITIES.len())].to_string())
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
    fn city_is_one_of_the_known_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let value = city(&json!({}), &mut rng);
        assert!(CITIES.contains(&value.as_str().unwrap()));
    }
}
