//! Messages emitted by a script run, in emission order

use serde::{Deserialize, Serialize};

use super::{BlockProto, ElementProto, NewElement, TableData};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardMsgMetadata {
    /// Position of the delta in the tree, from the root
    pub delta_path: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSession {
    pub script_run_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFinishedStatus {
    FinishedSuccessfully,
    FinishedWithCompileError,
    FinishedEarlyForRerun,
}

/// Incremental append to an existing table (not modeled by the tree)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddRows {
    pub data: TableData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delta {
    NewElement(NewElement),
    AddBlock(BlockProto),
    AddRows(AddRows),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgPayload {
    NewSession(NewSession),
    Delta(Delta),
    ScriptFinished(ScriptFinishedStatus),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardMsg {
    #[serde(default)]
    pub metadata: ForwardMsgMetadata,
    #[serde(flatten)]
    pub payload: MsgPayload,
}

impl ForwardMsg {
    pub fn new(delta_path: Vec<usize>, payload: MsgPayload) -> Self {
        Self {
            metadata: ForwardMsgMetadata { delta_path },
            payload,
        }
    }

    pub fn new_element(delta_path: Vec<usize>, element: impl Into<NewElement>) -> Self {
        Self::new(delta_path, MsgPayload::Delta(Delta::NewElement(element.into())))
    }

    pub fn add_block(delta_path: Vec<usize>, block: BlockProto) -> Self {
        Self::new(delta_path, MsgPayload::Delta(Delta::AddBlock(block)))
    }

    pub fn new_session(script_run_id: impl Into<String>) -> Self {
        Self::new(
            Vec::new(),
            MsgPayload::NewSession(NewSession {
                script_run_id: script_run_id.into(),
            }),
        )
    }

    pub fn script_finished(status: ScriptFinishedStatus) -> Self {
        Self::new(Vec::new(), MsgPayload::ScriptFinished(status))
    }

    pub fn delta_path(&self) -> &[usize] {
        &self.metadata.delta_path
    }

    pub fn delta(&self) -> Option<&Delta> {
        match &self.payload {
            MsgPayload::Delta(delta) => Some(delta),
            _ => None,
        }
    }

    /// Load an ordered message stream from a JSON array
    pub fn list_from_json(json: &str) -> crate::Result<Vec<ForwardMsg>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an ordered message stream from a YAML sequence
    pub fn list_from_yaml(yaml: &str) -> crate::Result<Vec<ForwardMsg>> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl From<ElementProto> for Delta {
    fn from(proto: ElementProto) -> Self {
        Delta::NewElement(NewElement::Known(proto))
    }
}
