// crates/simstream-providers/src/commerce.rs
// ============================================================================
// Module: Commerce Fake-Data Provider
// Description: `faker.commerce.*` functions.
// Purpose: The e-commerce domain pack `spec.md` §4.B gestures at as an
//          example of an extensible `faker.*` function.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use serde_json::Value as JsonValue;

const ADJECTIVES: &[&str] = &["Sleek", "Rustic", "Compact", "Handcrafted", "Premium", "Modular", "Vintage", "Ergonomic"];
const NOUNS: &[&str] = &["Chair", "Backpack", "Lamp", "Keyboard", "Mug", "Jacket", "Speaker", "Wallet"];

const DEPARTMENTS: &[&str] = &["Electronics", "Home & Kitchen", "Outdoors", "Apparel", "Sporting Goods", "Office", "Toys", "Books"];

/// `faker.commerce.product_name` — an "Adjective Noun" product name.
/// Ignores `params`.
#[must_use]
pub fn product_name(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    JsonValue::String(format!("{adjective} {noun}"))
}

/// `faker.commerce.department` — a random store department name. Ignores
/// `params`.
#[must_use]
pub fn department(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    JsonValue::String(DEPARTMENTS[rng.gen_range(0..DEPARTMENTS.len())].to_string())
}
