// crates/simstream-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Fatal, load-time error taxonomy (`spec.md` §7).
// Purpose: Distinguish the load-time failure modes from the per-event
//          `CoreError` taxonomy: every variant here aborts the process with
//          a diagnostic, not just the event in progress.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Configuration loading or validation errors. All variants are fatal: the
/// process aborts with a diagnostic rather than continuing with a partial
/// or inconsistent configuration (`spec.md` §7).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading a configuration or imported file.
    #[error("config io error: {0}")]
    Io(String),

    /// The document, or one of its imports, is not well-formed YAML.
    #[error("config parse error: {0}")]
    Parse(String),

    /// An `imports` entry named a file that does not exist or is not
    /// readable relative to its importing file.
    #[error("import not found: {0}")]
    ImportNotFound(String),

    /// Resolving `imports` revisited a file already on the current import
    /// chain.
    #[error("circular import: {0}")]
    CircularImport(String),

    /// The document parsed but violates a structural or semantic
    /// requirement (e.g. `min_required = 0`, `max_items < min_items`, a
    /// malformed `duration`).
    #[error("invalid config: {0}")]
    Invalid(String),
}
