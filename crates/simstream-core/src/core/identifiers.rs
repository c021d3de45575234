// crates/simstream-core/src/core/identifiers.rs
// ============================================================================
// Module: Simstream Identifiers
// Description: Canonical opaque names and ids used throughout the core.
// Purpose: Provide strongly typed, serializable identifiers with stable
//          string forms, distinguishing config-defined names from
//          runtime-assigned entity ids.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Names (`SchemaName`, `EntityTypeName`, `EventTypeName`, `ScenarioName`)
//! are declared in configuration and known at load time. `EntityId` is
//! assigned at runtime, either copied from `data[primary_key]` or freshly
//! generated, and is therefore modeled separately even though both wrap a
//! `String`.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! string_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_newtype!(SchemaName, "Name of a schema in the Schema Registry (`#/schemas/<name>`).");
string_newtype!(EntityTypeName, "Name of an entity type definition.");
string_newtype!(EventTypeName, "Name of an event type definition.");
string_newtype!(ScenarioName, "Name of a scenario definition.");
string_newtype!(OutputName, "Name of a configured output sink, used in diagnostics.");

/// Runtime identifier for an entity instance, scoped within its entity type.
///
/// Unlike the name types above, an `EntityId` is not known at config-load
/// time: it is copied from `data[primary_key]` when present, or freshly
/// generated (a v4 UUID rendered as a string) otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an entity id from any string-like value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let name = EntityTypeName::new("user");
        assert_eq!(name.to_string(), "user");
        assert_eq!(name.as_str(), "user");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(EntityId::new("a"), EntityId::from("a".to_string()));
        assert_ne!(EntityId::new("a"), EntityId::new("b"));
    }
}
