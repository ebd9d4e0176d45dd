//! Leaf element payloads
//!
//! `ElementProto` is a closed tagged union keyed by the wire `type` field.
//! A payload whose tag is not one of the known kinds decodes to
//! [`RawElement`] through [`NewElement::Unrecognized`], so streams from a
//! newer engine still load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields shared by every widget payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetMeta {
    /// Wire id, unique within a run
    pub id: String,
    pub label: String,
    pub help: String,
    /// Enclosing form id ("" outside forms)
    pub form_id: String,
    pub disabled: bool,
}

impl WidgetMeta {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Secondary discriminants
// ═══════════════════════════════════════════════════════════════

/// Heading sub-kind (wire field `tag`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingTag {
    Title,
    Header,
    Subheader,
}

impl HeadingTag {
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::Title),
            "h2" => Some(Self::Header),
            "h3" => Some(Self::Subheader),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Title => "h1",
            Self::Header => "h2",
            Self::Subheader => "h3",
        }
    }
}

/// Markdown sub-kind (wire field `element_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownType {
    Native,
    Caption,
    Latex,
    Divider,
}

impl MarkdownType {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Native),
            2 => Some(Self::Caption),
            4 => Some(Self::Latex),
            5 => Some(Self::Divider),
            _ => None,
        }
    }

    pub fn as_wire(self) -> i32 {
        match self {
            Self::Native => 1,
            Self::Caption => 2,
            Self::Latex => 4,
            Self::Divider => 5,
        }
    }
}

/// Slider sub-kind (wire field `slider_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderType {
    Slider,
    SelectSlider,
}

impl SliderType {
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Slider),
            2 => Some(Self::SelectSlider),
            _ => None,
        }
    }

    pub fn as_wire(self) -> i32 {
        match self {
            Self::Slider => 1,
            Self::SelectSlider => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberDataType {
    Int,
    #[default]
    Float,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliderDataType {
    Int,
    #[default]
    Float,
    Date,
    Time,
    Datetime,
}

// ═══════════════════════════════════════════════════════════════
// Payloads
// ═══════════════════════════════════════════════════════════════

/// Tabular data, replaced wholesale on every run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFrameProto {
    pub data: TableData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: bool,
    pub is_form_submitter: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckboxProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeProto {
    pub code_text: String,
    pub language: String,
    pub show_line_numbers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPickerProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: String,
}

/// Dates are ISO `YYYY-MM-DD` strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateInputProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Vec<String>,
    pub min: String,
    pub max: String,
    pub is_range: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionProto {
    pub type_name: String,
    pub message: String,
    pub message_is_markdown: bool,
    pub stack_trace: Vec<String>,
    pub is_warning: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingProto {
    /// "h1" | "h2" | "h3"
    pub tag: String,
    pub anchor: Option<String>,
    pub body: String,
    pub help: String,
    pub hide_anchor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonProto {
    pub body: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownProto {
    pub body: String,
    pub allow_html: bool,
    pub is_caption: bool,
    /// See [`MarkdownType`]
    pub element_type: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSelectProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Vec<i64>,
    pub options: Vec<String>,
    /// None means unlimited
    pub max_selections: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberInputProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    pub format: String,
    pub data_type: NumberDataType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<i64>,
    pub options: Vec<String>,
    pub horizontal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectboxProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<i64>,
    pub options: Vec<String>,
    pub placeholder: String,
}

/// Shared by numeric sliders and select sliders.
///
/// `default` has one entry for a scalar slider and two for a range slider;
/// its length is the declared arity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub options: Vec<String>,
    pub data_type: SliderDataType,
    /// See [`SliderType`]
    pub slider_type: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProto {
    pub body: String,
    pub help: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAreaProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<String>,
    pub height: Option<u32>,
    pub max_chars: Option<usize>,
    pub placeholder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextInputProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<String>,
    pub max_chars: Option<usize>,
    pub autocomplete: String,
    pub placeholder: String,
}

/// Times are `HH:MM` strings, `step` is in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeInputProto {
    #[serde(flatten)]
    pub meta: WidgetMeta,
    pub default: Option<String>,
    pub step: u32,
}

/// Known element kinds, keyed by the wire `type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementProto {
    ArrowDataFrame(DataFrameProto),
    Button(ButtonProto),
    Checkbox(CheckboxProto),
    Code(CodeProto),
    ColorPicker(ColorPickerProto),
    DateInput(DateInputProto),
    Exception(ExceptionProto),
    Heading(HeadingProto),
    Json(JsonProto),
    Markdown(MarkdownProto),
    Multiselect(MultiSelectProto),
    NumberInput(NumberInputProto),
    Radio(RadioProto),
    Selectbox(SelectboxProto),
    Slider(SliderProto),
    Text(TextProto),
    TextArea(TextAreaProto),
    TextInput(TextInputProto),
    TimeInput(TimeInputProto),
}

impl ElementProto {
    /// Wire `type` tag (primary discriminant)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArrowDataFrame(_) => "arrow_data_frame",
            Self::Button(_) => "button",
            Self::Checkbox(_) => "checkbox",
            Self::Code(_) => "code",
            Self::ColorPicker(_) => "color_picker",
            Self::DateInput(_) => "date_input",
            Self::Exception(_) => "exception",
            Self::Heading(_) => "heading",
            Self::Json(_) => "json",
            Self::Markdown(_) => "markdown",
            Self::Multiselect(_) => "multiselect",
            Self::NumberInput(_) => "number_input",
            Self::Radio(_) => "radio",
            Self::Selectbox(_) => "selectbox",
            Self::Slider(_) => "slider",
            Self::Text(_) => "text",
            Self::TextArea(_) => "text_area",
            Self::TextInput(_) => "text_input",
            Self::TimeInput(_) => "time_input",
        }
    }

    /// Whether `kind` is one of the wire tags above
    pub fn is_known_kind(kind: &str) -> bool {
        KNOWN_KINDS.contains(&kind)
    }
}

const KNOWN_KINDS: &[&str] = &[
    "arrow_data_frame",
    "button",
    "checkbox",
    "code",
    "color_picker",
    "date_input",
    "exception",
    "heading",
    "json",
    "markdown",
    "multiselect",
    "number_input",
    "radio",
    "selectbox",
    "slider",
    "text",
    "text_area",
    "text_input",
    "time_input",
];

/// Element with a `type` tag this harness does not model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Payload of a `new_element` delta.
///
/// A known tag whose fields fail to decode also lands in `Unrecognized`;
/// the tree builder rejects it instead of treating it as an unknown kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewElement {
    Known(ElementProto),
    Unrecognized(RawElement),
}

impl NewElement {
    pub fn kind(&self) -> &str {
        match self {
            Self::Known(proto) => proto.kind(),
            Self::Unrecognized(raw) => &raw.kind,
        }
    }
}

impl From<ElementProto> for NewElement {
    fn from(proto: ElementProto) -> Self {
        Self::Known(proto)
    }
}
