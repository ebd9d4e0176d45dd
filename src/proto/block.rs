//! Container payloads carried by `add_block` deltas

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalBlock {
    pub border: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalBlock {
    pub gap: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnBlock {
    pub weight: f64,
    pub gap: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandableBlock {
    pub label: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormBlock {
    pub form_id: String,
    pub clear_on_submit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabBlock {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockProto {
    Vertical(VerticalBlock),
    Horizontal(HorizontalBlock),
    Column(ColumnBlock),
    Expandable(ExpandableBlock),
    Form(FormBlock),
    TabContainer,
    Tab(TabBlock),
}

impl BlockProto {
    /// Wire `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vertical(_) => "vertical",
            Self::Horizontal(_) => "horizontal",
            Self::Column(_) => "column",
            Self::Expandable(_) => "expandable",
            Self::Form(_) => "form",
            Self::TabContainer => "tab_container",
            Self::Tab(_) => "tab",
        }
    }
}
