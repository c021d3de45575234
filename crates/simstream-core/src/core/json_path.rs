// crates/simstream-core/src/core/json_path.rs
// ============================================================================
// Module: Dotted JSON Path Navigation
// Description: Shared dotted-path field lookup over `serde_json::Value`.
// Purpose: Give `from_entity`, predicate field resolution, and
//          `from_payload_field` state updates one navigation rule, per
//          `spec.md` §4.B/§4.D: missing segments resolve to absent/null
//          rather than erroring.
// Dependencies: serde_json
// ============================================================================

use serde_json::Value as JsonValue;

/// Navigates `path` (dot-separated, e.g. `"address.city"`) through `root`,
/// returning a clone of the value found, or `None` if any segment is
/// missing or the path indexes into a non-object.
#[must_use]
pub fn navigate(root: &JsonValue, path: &str) -> Option<JsonValue> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current.clone())
}
