//! Session state snapshot (read-only view of one run)
//!
//! The engine owns session state; after each run it hands the harness an
//! immutable snapshot. Trees built from that run hold it behind an `Arc`,
//! so later runs never change what an earlier tree reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::user_key_from_widget_id;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    /// wire id -> widget value
    widgets: HashMap<String, Value>,
    /// user key -> value set by the script (`st.session_state[key] = ...`)
    user: HashMap<String, Value>,
}

impl SessionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_widget(mut self, widget_id: impl Into<String>, value: Value) -> Self {
        self.insert_widget(widget_id, value);
        self
    }

    pub fn with_user(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert_user(key, value);
        self
    }

    pub fn insert_widget(&mut self, widget_id: impl Into<String>, value: Value) {
        self.widgets.insert(widget_id.into(), value);
    }

    pub fn insert_user(&mut self, key: impl Into<String>, value: Value) {
        self.user.insert(key.into(), value);
    }

    /// Value of a widget by its wire id
    pub fn widget_value(&self, widget_id: &str) -> Option<&Value> {
        self.widgets.get(widget_id)
    }

    /// Look up by wire id, then by widget user key, then by user-set key
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.widgets.get(key) {
            return Some(value);
        }
        self.widgets
            .iter()
            .find(|(id, _)| user_key_from_widget_id(id) == Some(key))
            .map(|(_, value)| value)
            .or_else(|| self.user.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn widget_ids(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.widgets.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty() && self.user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_by_id_key_and_user_value() {
        let snapshot = SessionSnapshot::new()
            .with_widget("$$WIDGET_ID-ab12-radio", json!("a"))
            .with_widget("$$WIDGET_ID-cd34-None", json!(true))
            .with_user("other", json!(5));

        assert_eq!(snapshot.get("$$WIDGET_ID-ab12-radio"), Some(&json!("a")));
        assert_eq!(snapshot.get("radio"), Some(&json!("a")));
        assert_eq!(snapshot.get("other"), Some(&json!(5)));
        assert_eq!(snapshot.get("None"), None);
        assert!(!snapshot.contains("missing"));
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_widget_value_ignores_user_keys() {
        let snapshot = SessionSnapshot::new().with_user("k", json!(1));
        assert_eq!(snapshot.widget_value("k"), None);
    }
}
