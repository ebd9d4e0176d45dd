//! Widget value records sent into the next run

use serde::{Deserialize, Serialize};

/// Exactly one wire shape per record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetStateValue {
    TriggerValue(bool),
    BoolValue(bool),
    DoubleValue(f64),
    IntValue(i64),
    StringValue(String),
    StringArrayValue(Vec<String>),
    IntArrayValue(Vec<i64>),
    DoubleArrayValue(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetState {
    pub id: String,
    #[serde(flatten)]
    pub value: WidgetStateValue,
}

impl WidgetState {
    pub fn new(id: impl Into<String>, value: WidgetStateValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Batch of widget records, keyed by wire id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetStates {
    pub widgets: Vec<WidgetState>,
}

impl WidgetStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing an earlier record for the same id
    pub fn push(&mut self, state: WidgetState) {
        match self.widgets.iter_mut().find(|w| w.id == state.id) {
            Some(existing) => *existing = state,
            None => self.widgets.push(state),
        }
    }

    pub fn get(&self, id: &str) -> Option<&WidgetStateValue> {
        self.widgets.iter().find(|w| w.id == id).map(|w| &w.value)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetState> {
        self.widgets.iter()
    }
}

impl FromIterator<WidgetState> for WidgetStates {
    fn from_iter<I: IntoIterator<Item = WidgetState>>(iter: I) -> Self {
        let mut states = WidgetStates::new();
        for state in iter {
            states.push(state);
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_replaces_same_id() {
        let mut states = WidgetStates::new();
        states.push(WidgetState::new("a", WidgetStateValue::IntValue(0)));
        states.push(WidgetState::new("b", WidgetStateValue::BoolValue(true)));
        states.push(WidgetState::new("a", WidgetStateValue::IntValue(2)));

        assert_eq!(states.len(), 2);
        assert_eq!(states.get("a"), Some(&WidgetStateValue::IntValue(2)));
        assert_eq!(states.get("missing"), None);
    }

    #[test]
    fn test_widget_state_json_shape() {
        let state = WidgetState::new("x", WidgetStateValue::DoubleArrayValue(vec![1.0, 2.5]));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({"id": "x", "double_array_value": [1.0, 2.5]}));
    }
}
