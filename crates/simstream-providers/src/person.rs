// crates/simstream-providers/src/person.rs
// ============================================================================
// Module: Person Fake-Data Provider
// Description: `faker.person.*` functions.
// Purpose: Produce plausible human names without any network or filesystem
//          dependency.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use serde_json::Value as JsonValue;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Liam", "Noah", "Emma", "Oliver", "Sophia", "Mateo", "Isabella", "Lucas", "Mia", "Ethan", "Amara", "Hiro", "Priya", "Zainab", "Kwame",
];

const LAST_NAMES: &[&str] = &[
    "Nguyen", "Smith", "Garcia", "Kim", "Johnson", "Patel", "Okafor", "Kowalski", "Rossi", "Andersson", "Haddad", "Ivanov", "Silva", "Tanaka",
];

/// `faker.person.name` — a random "First Last" combination. Ignores `params`.
#[must_use]
pub fn name(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    JsonValue::String(format!("{first} {last}"))
}
