//! # Script Engine Seam
//!
//! The harness drives an external script-execution engine through the
//! [`ScriptEngine`] trait. The engine runs the user script on its own unit
//! of execution, appends [`ForwardMsg`]s to an ordered queue and reports
//! progress through [`LifecycleEvent`]s.
//!
//! ## Contract
//!
//! | Call | Meaning |
//! |------|---------|
//! | `start(rerun)` | Spawn the execution unit and run once with `rerun` |
//! | `request_rerun(rerun)` | Begin a new run; clears the message queue and lifecycle signals of the previous run |
//! | `request_stop()` | Cooperative stop; the current run aborts at its next checkpoint |
//! | `join()` | Block until the execution unit has fully terminated |
//!
//! The message queue is append-only during a run and safe to read once a
//! terminal signal has been observed.
//!
//! [`LocalScriptEngine`] is the in-process implementation shipped with the
//! crate: it runs a Rust closure on a background thread.

mod local;
mod resources;
mod script;

pub use local::LocalScriptEngine;
pub use resources::{EngineResources, ScriptCache, UploadedFile, UploadedFileManager};
pub use script::{compute_widget_id, Script, ScriptContext, ScriptError, ScriptResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::proto::{ForwardMsg, WidgetStates};
use crate::session::SessionSnapshot;

// ============================================================================
// WIDGET KEY CONVENTION
// ============================================================================

/// Prefix of engine-generated widget ids
pub const GENERATED_WIDGET_ID_PREFIX: &str = "$$WIDGET_ID";

/// `$$WIDGET_ID-<hash>-<user key or None>`
static WIDGET_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\$WIDGET_ID-([0-9a-f]+)-(.+)$").expect("widget id pattern"));

/// User-assigned key encoded in a widget id, if any.
///
/// Ids that do not follow the generated format are user keys themselves.
/// Only a key segment of exactly `None` means no user key.
pub fn user_key_from_widget_id(widget_id: &str) -> Option<&str> {
    match WIDGET_ID_PATTERN.captures(widget_id) {
        Some(caps) => caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|key| *key != "None"),
        None => Some(widget_id),
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Progress signals emitted by the engine during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    ScriptStarted,
    StoppedForRerun,
    StoppedWithCompileError,
    StoppedWithSuccess,
    Shutdown,
}

impl LifecycleEvent {
    /// One of the three signals that end a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::StoppedForRerun | Self::StoppedWithCompileError | Self::StoppedWithSuccess
        )
    }
}

/// Input of a single run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerunData {
    /// Initial widget state; `None` runs with fresh/default state
    pub widget_states: Option<WidgetStates>,
}

impl RerunData {
    pub fn with_widget_states(widget_states: WidgetStates) -> Self {
        Self {
            widget_states: Some(widget_states),
        }
    }
}

// ============================================================================
// ENGINE TRAIT
// ============================================================================

pub trait ScriptEngine: Send {
    /// Engine name (for logs)
    fn name(&self) -> &str;

    /// Spawn the execution unit and begin the first run
    fn start(&mut self, rerun: RerunData) -> Result<()>;

    /// Whether the execution unit is alive
    fn is_started(&self) -> bool;

    /// Begin a new run on the live execution unit
    fn request_rerun(&mut self, rerun: RerunData) -> Result<()>;

    /// Ask the current run to stop at its next checkpoint and the unit to exit
    fn request_stop(&mut self);

    /// Wait for the execution unit to terminate (no-op when not started)
    fn join(&mut self);

    /// Lifecycle signals of the current run, in emission order
    fn lifecycle_events(&self) -> Vec<LifecycleEvent>;

    /// Messages of the current run, in emission order
    fn forward_msgs(&self) -> Vec<ForwardMsg>;

    /// Session state as of the end of the current run
    fn session_snapshot(&self) -> SessionSnapshot;

    /// Whether the current run has emitted a terminal signal
    fn script_stopped(&self) -> bool {
        self.lifecycle_events().iter().any(LifecycleEvent::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_from_generated_id() {
        assert_eq!(user_key_from_widget_id("$$WIDGET_ID-9f3a-my_key"), Some("my_key"));
        assert_eq!(user_key_from_widget_id("$$WIDGET_ID-9f3a-None"), None);
    }

    #[test]
    fn test_user_key_keeps_dashes() {
        assert_eq!(user_key_from_widget_id("$$WIDGET_ID-9f3a-a-b-c"), Some("a-b-c"));
    }

    #[test]
    fn test_user_key_ending_in_none_is_kept() {
        assert_eq!(user_key_from_widget_id("$$WIDGET_ID-9f3a-opt-None"), Some("opt-None"));
        assert_eq!(user_key_from_widget_id("$$WIDGET_ID-9f3a-NoneSuch"), Some("NoneSuch"));
    }

    #[test]
    fn test_user_key_from_plain_id() {
        assert_eq!(user_key_from_widget_id("checkbox"), Some("checkbox"));
    }

    #[test]
    fn test_terminal_events() {
        assert!(LifecycleEvent::StoppedWithSuccess.is_terminal());
        assert!(LifecycleEvent::StoppedForRerun.is_terminal());
        assert!(LifecycleEvent::StoppedWithCompileError.is_terminal());
        assert!(!LifecycleEvent::ScriptStarted.is_terminal());
        assert!(!LifecycleEvent::Shutdown.is_terminal());
    }
}
