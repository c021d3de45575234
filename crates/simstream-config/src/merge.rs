// crates/simstream-config/src/merge.rs
// ============================================================================
// Module: Config Merge
// Description: Deep merge of two parsed YAML documents (`spec.md` §6's
//              `imports` rule).
// Purpose: Implement "importing file overrides imported" before either
//          document is deserialized into typed config, so merge is a
//          structural operation over the raw document rather than a
//          field-by-field reconciliation of typed structs.
// Dependencies: serde_yaml
// ============================================================================

//! ## Overview
//! [`merge_over`] takes `overlay` (closer to the importing file) and `base`
//! (closer to the imported file) and folds `overlay` on top: mappings
//! recurse per key, sequences concatenate with `base`'s items first, and
//! anything else (scalars, or a type mismatch between the two sides) is a
//! scalar overwrite — `overlay` wins outright.

use serde_yaml::Mapping;
use serde_yaml::Value;

/// Merges `overlay` over `base` per `spec.md` §6: mapping keys recurse,
/// sequences concatenate (`base` first), everything else is an overwrite.
#[must_use]
pub fn merge_over(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => Value::Mapping(merge_mappings(base_map, overlay_map)),
        (Value::Sequence(mut base_seq), Value::Sequence(overlay_seq)) => {
            base_seq.extend(overlay_seq);
            Value::Sequence(base_seq)
        }
        (_, overlay) => overlay,
    }
}

fn merge_mappings(base: Mapping, overlay: Mapping) -> Mapping {
    let mut merged = base;
    for (key, overlay_value) in overlay {
        let merged_value = match merged.remove(&key) {
            Some(base_value) => merge_over(base_value, overlay_value),
            None => overlay_value,
        };
        merged.insert(key, merged_value);
    }
    merged
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn scalar_overwrite_prefers_overlay() {
        let merged = merge_over(yaml("a: 1"), yaml("a: 2"));
        assert_eq!(merged["a"], Value::from(2));
    }

    #[test]
    fn mappings_recurse_per_key() {
        let base = yaml("outer:\n  a: 1\n  b: 2\n");
        let overlay = yaml("outer:\n  b: 20\n  c: 3\n");
        let merged = merge_over(base, overlay);
        assert_eq!(merged["outer"]["a"], Value::from(1));
        assert_eq!(merged["outer"]["b"], Value::from(20));
        assert_eq!(merged["outer"]["c"], Value::from(3));
    }

    #[test]
    fn sequences_concatenate_base_first() {
        let base = yaml("items:\n  - x\n  - y\n");
        let overlay = yaml("items:\n  - z\n");
        let merged = merge_over(base, overlay);
        let items: Vec<&str> = merged["items"].as_sequence().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(items, vec!["x", "y", "z"]);
    }

    #[test]
    fn type_mismatch_falls_back_to_overwrite() {
        let merged = merge_over(yaml("a:\n  - 1\n"), yaml("a: 2"));
        assert_eq!(merged["a"], Value::from(2));
    }
}
