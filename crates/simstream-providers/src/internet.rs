// crates/simstream-providers/src/internet.rs
// ============================================================================
// Module: Internet Fake-Data Provider
// Description: `faker.internet.*` functions.
// Purpose: Produce plausible email addresses for generated payloads.
// Dependencies: rand, serde_json
// ============================================================================

use rand::Rng;
use serde_json::Value as JsonValue;

const HANDLES: &[&str] = &["alex", "jordan", "sam", "taylor", "casey", "morgan", "riley", "quinn", "drew", "skyler"];
const DOMAINS: &[&str] = &["example.com", "mailbox.dev", "inbox.test", "webmail.io"];

/// `faker.internet.email` — a random `handle<n>@domain` address. Ignores
/// `params`.
#[must_use]
pub fn email(_params: &JsonValue, rng: &mut dyn rand::RngCore) -> JsonValue {
    let handle = HANDLES[rng.gen_range(0..HANDLES.len())];
    let domain = DOMAINS[rng.gen_range(0..DOMAINS.len())];
    let suffix: u16 = rng.gen_range(0..10_000);
    JsonValue::String(format!("{handle}{suffix}@{domain}"))
}
