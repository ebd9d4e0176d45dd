//! Error types with fix suggestions
//!
//! Error code ranges:
//! - APPTEST-010-019: Tree construction errors (fatal, no partial tree)
//! - APPTEST-020-029: Lookup errors (recoverable at point of use)
//! - APPTEST-030-039: Run/rerun errors
//! - APPTEST-040-049: Configuration and IO errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppTestError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum AppTestError {
    // ═══════════════════════════════════════════
    // CONSTRUCTION ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[APPTEST-010] Delta message has an empty delta path")]
    EmptyDeltaPath,

    #[error("[APPTEST-011] Delta path {path:?} crosses a '{found}' element at depth {depth} (expected a block)")]
    NotABlock {
        path: Vec<usize>,
        depth: usize,
        found: String,
    },

    #[error("[APPTEST-012] Unknown {element} subtype '{subtype}'")]
    UnknownSubtype { element: String, subtype: String },

    #[error("[APPTEST-013] Malformed '{kind}' element: {details}")]
    MalformedElement { kind: String, details: String },

    // ═══════════════════════════════════════════
    // LOOKUP ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[APPTEST-020] No widget with key '{key}'")]
    KeyNotFound { key: String },

    #[error("[APPTEST-021] Value {value} is not one of the options of widget '{widget_id}'")]
    OptionNotFound { widget_id: String, value: String },

    #[error("[APPTEST-022] Widget '{widget_id}' expects {expected} value(s), got {actual}")]
    RangeArity {
        widget_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("[APPTEST-023] Session state has no value for widget '{widget_id}'")]
    StateNotFound { widget_id: String },

    #[error("[APPTEST-024] Session value for widget '{widget_id}' is not a {expected}: {details}")]
    StateType {
        widget_id: String,
        expected: String,
        details: String,
    },

    // ═══════════════════════════════════════════
    // RUN ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[APPTEST-030] Script run timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("[APPTEST-031] Script engine error: {reason}")]
    Engine { reason: String },

    #[error("[APPTEST-032] Tree is not linked to an AppTest and cannot be rerun")]
    NotLinked,

    // ═══════════════════════════════════════════
    // CONFIG / IO ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[APPTEST-040] Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("[APPTEST-041] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[APPTEST-042] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("[APPTEST-043] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AppTestError {
    /// Stable error code (e.g. "APPTEST-030")
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDeltaPath => "APPTEST-010",
            Self::NotABlock { .. } => "APPTEST-011",
            Self::UnknownSubtype { .. } => "APPTEST-012",
            Self::MalformedElement { .. } => "APPTEST-013",
            Self::KeyNotFound { .. } => "APPTEST-020",
            Self::OptionNotFound { .. } => "APPTEST-021",
            Self::RangeArity { .. } => "APPTEST-022",
            Self::StateNotFound { .. } => "APPTEST-023",
            Self::StateType { .. } => "APPTEST-024",
            Self::Timeout { .. } => "APPTEST-030",
            Self::Engine { .. } => "APPTEST-031",
            Self::NotLinked => "APPTEST-032",
            Self::Config { .. } => "APPTEST-040",
            Self::Io(_) => "APPTEST-041",
            Self::Json(_) => "APPTEST-042",
            Self::Yaml(_) => "APPTEST-043",
        }
    }

    /// Construction errors abort tree building entirely
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::EmptyDeltaPath
                | Self::NotABlock { .. }
                | Self::UnknownSubtype { .. }
                | Self::MalformedElement { .. }
        )
    }

    /// Lookup errors are raised at the point of use and can be handled by the caller
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound { .. }
                | Self::OptionNotFound { .. }
                | Self::RangeArity { .. }
                | Self::StateNotFound { .. }
                | Self::StateType { .. }
        )
    }
}

impl FixSuggestion for AppTestError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            AppTestError::EmptyDeltaPath => Some("Every delta message needs at least one path index"),
            AppTestError::NotABlock { .. } => {
                Some("The message stream is malformed or out of order: a container must be declared before its children")
            }
            AppTestError::UnknownSubtype { .. } => {
                Some("The engine speaks a newer protocol version than this harness")
            }
            AppTestError::MalformedElement { .. } => {
                Some("The engine sent a known element kind with fields of the wrong type")
            }
            AppTestError::KeyNotFound { .. } => {
                Some("Check the widget was rendered in this run and declared with that key")
            }
            AppTestError::OptionNotFound { .. } => Some("Pick a value from the widget's declared options"),
            AppTestError::RangeArity { .. } => {
                Some("Use a single value for scalar sliders and a (low, high) pair for range sliders")
            }
            AppTestError::StateNotFound { .. } => {
                Some("The widget has no session value yet; set an explicit value before encoding")
            }
            AppTestError::StateType { .. } => Some("Check the value type the script stores for this widget"),
            AppTestError::Timeout { .. } => {
                Some("Increase the timeout with run_with_timeout() or AppTestConfig::default_timeout")
            }
            AppTestError::Engine { .. } => Some("Check the script engine logs (RUST_LOG=apptest=debug)"),
            AppTestError::NotLinked => Some("Build trees through AppTest::run() to enable chained reruns"),
            AppTestError::Config { .. } => Some("Durations must be positive milliseconds"),
            AppTestError::Io(_) => Some("Check file path and permissions"),
            AppTestError::Json(_) => Some("Check the JSON message fixture syntax"),
            AppTestError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
        }
    }
}
