// crates/simstream-config/src/loader.rs
// ============================================================================
// Module: Config Loader
// Description: Reads a configuration document and its `imports` chain
//              (`spec.md` §6), resolving and merging depth-first before
//              deserializing into `RawConfig`.
// Purpose: Turn a path on disk into a single, fully-merged `RawConfig`
//          ready for validation.
// Dependencies: crate::merge, crate::model, serde_yaml, std::fs
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::merge::merge_over;
use crate::model::RawConfig;

const IMPORTS_KEY: &str = "imports";

/// Loads and fully resolves the configuration document at `path`: reads it,
/// depth-first resolves and merges every `imports` entry beneath it, then
/// deserializes the merged document.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if `path` cannot be read,
/// [`ConfigError::ImportNotFound`] if an `imports` entry cannot be read,
/// [`ConfigError::CircularImport`] if an import chain revisits a file
/// already being resolved, [`ConfigError::Parse`] for malformed YAML, or
/// bubbles up the same for the final typed deserialization.
pub fn load_config(path: impl AsRef<Path>) -> Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    let mut chain = Vec::new();
    let canonical = fs::canonicalize(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    let merged = resolve(path, canonical, &mut chain)?;
    serde_yaml::from_value(merged).map_err(|err| ConfigError::Parse(err.to_string()))
}

fn resolve_import(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Value, ConfigError> {
    let canonical = fs::canonicalize(path).map_err(|_| ConfigError::ImportNotFound(path.display().to_string()))?;
    resolve(path, canonical, chain)
}

fn resolve(path: &Path, canonical: PathBuf, chain: &mut Vec<PathBuf>) -> Result<Value, ConfigError> {
    if chain.contains(&canonical) {
        return Err(ConfigError::CircularImport(path.display().to_string()));
    }
    chain.push(canonical);

    let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    let mut document: Value = serde_yaml::from_str(&text).map_err(|err| ConfigError::Parse(format!("{}: {err}", path.display())))?;
    let imports = take_imports(&mut document);
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut merged = Value::Mapping(Mapping::new());
    for import in imports {
        let imported = resolve_import(&base_dir.join(&import), chain)?;
        merged = merge_over(merged, imported);
    }
    merged = merge_over(merged, document);

    chain.pop();
    Ok(merged)
}

/// Removes and returns the `imports` list from `document`, if present, so
/// it never reaches the final `RawConfig` deserialization as leftover data
/// from an already-resolved document.
fn take_imports(document: &mut Value) -> Vec<String> {
    let Some(mapping) = document.as_mapping_mut() else {
        return Vec::new();
    };
    let Some(Value::Sequence(entries)) = mapping.remove(Value::from(IMPORTS_KEY)) else {
        return Vec::new();
    };
    entries.into_iter().filter_map(|entry| entry.as_str().map(str::to_string)).collect()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use std::fs;

    use super::*;

    fn minimal_settings() -> &'static str {
        "simulation_settings:\n  time_progression:\n    start_time: now\n    time_multiplier: 1.0\n"
    }

    #[test]
    fn loads_a_document_with_no_imports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.yaml");
        fs::write(&path, format!("version: \"1\"\n{}", minimal_settings())).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.version, "1");
        assert!(config.imports.is_empty());
    }

    #[test]
    fn importing_file_overrides_imported_scalar_field() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.yaml"),
            "schemas:\n  user:\n    type: object\n    properties:\n      tier:\n        type: string\n        format: legacy\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("main.yaml"),
            format!(
                "version: \"1\"\n{}imports:\n  - base.yaml\nschemas:\n  user:\n    type: object\n    properties:\n      tier:\n        format: current\n",
                minimal_settings()
            ),
        )
        .unwrap();

        let config = load_config(dir.path().join("main.yaml")).unwrap();
        let tier = &config.schemas[&simstream_core::core::identifiers::SchemaName::new("user")]
            .properties
            .as_ref()
            .unwrap()["tier"];
        assert_eq!(tier.format.as_deref(), Some("current"));
        assert_eq!(tier.type_name.as_deref(), Some("string"));
    }

    #[test]
    fn imported_lists_concatenate_with_imported_entries_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.yaml"), "outputs:\n  - type: stdout\n    format: json\n").unwrap();
        fs::write(
            dir.path().join("main.yaml"),
            format!(
                "version: \"1\"\n{}imports:\n  - base.yaml\noutputs:\n  - type: file\n    format: json\n    path: out.jsonl\n",
                minimal_settings()
            ),
        )
        .unwrap();

        let config = load_config(dir.path().join("main.yaml")).unwrap();
        assert_eq!(config.outputs.len(), 2);
        assert_eq!(config.outputs[0].kind, crate::model::OutputKind::Stdout);
        assert_eq!(config.outputs[1].kind, crate::model::OutputKind::File);
    }

    #[test]
    fn missing_import_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.yaml"),
            format!("version: \"1\"\n{}imports:\n  - missing.yaml\n", minimal_settings()),
        )
        .unwrap();

        let err = load_config(dir.path().join("main.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ImportNotFound(_)));
    }

    #[test]
    fn circular_import_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), "imports:\n  - b.yaml\n").unwrap();
        fs::write(dir.path().join("b.yaml"), "imports:\n  - a.yaml\n").unwrap();

        let err = load_config(dir.path().join("a.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CircularImport(_)));
    }
}
