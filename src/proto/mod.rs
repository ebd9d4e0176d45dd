//! Wire model consumed from and produced for the script engine
//!
//! - [`ForwardMsg`]: one message of the ordered stream emitted by a run
//! - [`Delta`]: tree mutation carried by a message (new element, add block, add rows)
//! - [`ElementProto`] / [`BlockProto`]: leaf and container payloads
//! - [`WidgetStates`]: per-widget value records sent into the next run
//!
//! All types derive serde so message streams can be captured and replayed
//! from JSON or YAML fixtures.

mod block;
mod element;
mod forward_msg;
mod widget_state;

pub use block::{
    BlockProto, ColumnBlock, ExpandableBlock, FormBlock, HorizontalBlock, TabBlock, VerticalBlock,
};
pub use element::{
    ButtonProto, CheckboxProto, CodeProto, ColorPickerProto, DataFrameProto, DateInputProto,
    ElementProto, ExceptionProto, HeadingProto, HeadingTag, JsonProto, MarkdownProto, MarkdownType,
    MultiSelectProto, NewElement, NumberDataType, NumberInputProto, RadioProto, RawElement,
    SelectboxProto, SliderDataType, SliderProto, SliderType, TableData, TextAreaProto,
    TextInputProto, TextProto, TimeInputProto, WidgetMeta,
};
pub use forward_msg::{
    AddRows, Delta, ForwardMsg, ForwardMsgMetadata, MsgPayload, NewSession, ScriptFinishedStatus,
};
pub use widget_state::{WidgetState, WidgetStateValue, WidgetStates};
