// crates/simstream-providers/src/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Dispatches `faker.<provider>.<method>` leaf generator calls
//              (`spec.md` §4.B) to the built-in domain pack functions.
// Purpose: Implement `simstream_core::interfaces::FakeProvider` by name
//          lookup, the way the generator expects to reach fake-data
//          functions without knowing their implementations.
// Dependencies: simstream-core, std
// ============================================================================

//! ## Overview
//! `simstream_core::runtime::generators::generate_leaf` strips the `faker.`
//! prefix and passes the remainder (e.g. `person.name`) as `name` here.
//! [`ProviderRegistry`] is a `BTreeMap` from that dotted suffix to a function
//! pointer, so adding a new fake-data function is a one-line registration,
//! not a new enum variant.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use simstream_core::interfaces::FakeProvider;
use simstream_core::interfaces::FakeProviderError;

use crate::address;
use crate::commerce;
use crate::internet;
use crate::lorem;
use crate::person;

type ProviderFn = fn(&JsonValue, &mut dyn rand::RngCore) -> JsonValue;

/// Registry of built-in `faker.*` functions, keyed by their dotted suffix.
pub struct ProviderRegistry {
    functions: BTreeMap<&'static str, ProviderFn>,
}

impl ProviderRegistry {
    /// Creates a registry with every built-in domain-pack function
    /// registered.
    #[must_use]
    pub fn with_builtin_functions() -> Self {
        let mut functions: BTreeMap<&'static str, ProviderFn> = BTreeMap::new();
        functions.insert("person.name", person::name);
        functions.insert("internet.email", internet::email);
        functions.insert("commerce.product_name", commerce::product_name);
        functions.insert("commerce.department", commerce::department);
        functions.insert("lorem.word", lorem::word);
        functions.insert("address.city", address::city);
        Self { functions }
    }

    /// Registers an additional function under `name`, overriding any
    /// built-in registered under the same name.
    pub fn register(&mut self, name: &'static str, function: ProviderFn) {
        self.functions.insert(name, function);
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtin_functions()
    }
}

impl FakeProvider for ProviderRegistry {
    fn call(&self, name: &str, params: &JsonValue, rng: &mut dyn rand::RngCore) -> Result<JsonValue, FakeProviderError> {
        let Some(function) = self.functions.get(name) else {
            return Err(FakeProviderError::UnknownFunction(name.to_string()));
        };
        Ok(function(params, rng))
    }
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
    fn dispatches_known_function_by_dotted_name() {
        let registry = ProviderRegistry::with_builtin_functions();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let value = registry.call("lorem.word", &json!({}), &mut rng).unwrap();
        assert!(value.is_string());
    }

    #[test]
    fn unknown_name_fails_closed() {
        let registry = ProviderRegistry::with_builtin_functions();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let err = registry.call("person.ssn", &json!({}), &mut rng).unwrap_err();
        assert_eq!(err, FakeProviderError::UnknownFunction("person.ssn".to_string()));
    }
}
