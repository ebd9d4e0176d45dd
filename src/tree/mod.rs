//! # Element Tree
//!
//! Queryable snapshot of the UI produced by one script run.
//!
//! ```text
//! root
//! ├── [0] main      (always present)
//! │   ├── [0] text
//! │   └── [1] expandable
//! │       └── [0] radio
//! └── [1] sidebar   (always present)
//! ```
//!
//! - [`Node`]: an [`Element`] (leaf) or a [`Block`] (container)
//! - [`Element`]: closed union over the modeled kinds, plus [`UnknownElement`]
//! - widgets ([`Radio`], [`Slider`], ...) carry a tri-state [`Overlay`]
//! - [`AppTree`]: root block, session snapshot and the [`AppTest`] handle
//!   used for chained reruns
//!
//! Trees are rebuilt from scratch every run by [`parse_tree_from_messages`].

mod block;
mod builder;
mod element;
mod query;
mod widget;

pub use block::{Block, BlockTag, PreOrder};
pub use builder::parse_tree_from_messages;
pub use element::{Code, Dataframe, Exception, Heading, Json, Markdown, Text, UnknownElement};
pub use query::{ElementList, WidgetList};
pub use widget::{
    Button, Checkbox, ColorPicker, DateInput, Multiselect, NumberInput, Overlay, OverlayCell,
    Radio, SelectSlider, Selectbox, Slider, TextArea, TextInput, TimeInput, Widget, WidgetCore,
    WidgetValue,
};

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::app_test::AppTest;
use crate::error::{AppTestError, Result};
use crate::proto::WidgetStates;
use crate::session::SessionSnapshot;

/// Value contract shared by every node kind
pub trait ResolveValue {
    type Output;

    /// Typed resolved value
    fn resolve(&self) -> Result<Self::Output>;

    /// Resolved value as JSON
    fn resolve_json(&self) -> Result<Value>;
}

// ============================================================================
// ELEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Button(Button),
    Caption(Markdown),
    Checkbox(Checkbox),
    Code(Code),
    ColorPicker(ColorPicker),
    Dataframe(Dataframe),
    DateInput(DateInput),
    Divider(Markdown),
    Exception(Exception),
    Header(Heading),
    Json(Json),
    Latex(Markdown),
    Markdown(Markdown),
    Multiselect(Multiselect),
    NumberInput(NumberInput),
    Radio(Radio),
    SelectSlider(SelectSlider),
    Selectbox(Selectbox),
    Slider(Slider),
    Subheader(Heading),
    Text(Text),
    TextArea(TextArea),
    TextInput(TextInput),
    TimeInput(TimeInput),
    Title(Heading),
    /// Wire tag not modeled by this crate
    Unknown(UnknownElement),
}

/// Evaluate `$body` with `$el` bound to the payload of any variant
macro_rules! each_element {
    ($value:expr, $el:ident => $body:expr) => {
        match $value {
            Element::Button($el) => $body,
            Element::Caption($el) => $body,
            Element::Checkbox($el) => $body,
            Element::Code($el) => $body,
            Element::ColorPicker($el) => $body,
            Element::Dataframe($el) => $body,
            Element::DateInput($el) => $body,
            Element::Divider($el) => $body,
            Element::Exception($el) => $body,
            Element::Header($el) => $body,
            Element::Json($el) => $body,
            Element::Latex($el) => $body,
            Element::Markdown($el) => $body,
            Element::Multiselect($el) => $body,
            Element::NumberInput($el) => $body,
            Element::Radio($el) => $body,
            Element::SelectSlider($el) => $body,
            Element::Selectbox($el) => $body,
            Element::Slider($el) => $body,
            Element::Subheader($el) => $body,
            Element::Text($el) => $body,
            Element::TextArea($el) => $body,
            Element::TextInput($el) => $body,
            Element::TimeInput($el) => $body,
            Element::Title($el) => $body,
            Element::Unknown($el) => $body,
        }
    };
}

macro_rules! element_casts {
    ($($fn_name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Element {
            $(
                pub fn $fn_name(&self) -> Option<&$ty> {
                    match self {
                        Element::$variant(el) => Some(el),
                        _ => None,
                    }
                }
            )*
        }
    };
}

element_casts! {
    as_button => Button(Button),
    as_checkbox => Checkbox(Checkbox),
    as_code => Code(Code),
    as_color_picker => ColorPicker(ColorPicker),
    as_dataframe => Dataframe(Dataframe),
    as_date_input => DateInput(DateInput),
    as_exception => Exception(Exception),
    as_json => Json(Json),
    as_multiselect => Multiselect(Multiselect),
    as_number_input => NumberInput(NumberInput),
    as_radio => Radio(Radio),
    as_select_slider => SelectSlider(SelectSlider),
    as_selectbox => Selectbox(Selectbox),
    as_slider => Slider(Slider),
    as_text => Text(Text),
    as_text_area => TextArea(TextArea),
    as_text_input => TextInput(TextInput),
    as_time_input => TimeInput(TimeInput),
    as_unknown => Unknown(UnknownElement),
}

impl Element {
    /// Node type tag, e.g. `"radio"`, `"title"`, `"caption"`
    pub fn type_tag(&self) -> &str {
        match self {
            Element::Button(_) => "button",
            Element::Caption(_) => "caption",
            Element::Checkbox(_) => "checkbox",
            Element::Code(_) => "code",
            Element::ColorPicker(_) => "color_picker",
            Element::Dataframe(_) => "arrow_data_frame",
            Element::DateInput(_) => "date_input",
            Element::Divider(_) => "divider",
            Element::Exception(_) => "exception",
            Element::Header(_) => "header",
            Element::Json(_) => "json",
            Element::Latex(_) => "latex",
            Element::Markdown(_) => "markdown",
            Element::Multiselect(_) => "multiselect",
            Element::NumberInput(_) => "number_input",
            Element::Radio(_) => "radio",
            Element::SelectSlider(_) => "select_slider",
            Element::Selectbox(_) => "selectbox",
            Element::Slider(_) => "slider",
            Element::Subheader(_) => "subheader",
            Element::Text(_) => "text",
            Element::TextArea(_) => "text_area",
            Element::TextInput(_) => "text_input",
            Element::TimeInput(_) => "time_input",
            Element::Title(_) => "title",
            Element::Unknown(el) => el.kind(),
        }
    }

    pub fn as_widget(&self) -> Option<&dyn Widget> {
        let widget: &dyn Widget = match self {
            Element::Button(w) => w,
            Element::Checkbox(w) => w,
            Element::ColorPicker(w) => w,
            Element::DateInput(w) => w,
            Element::Multiselect(w) => w,
            Element::NumberInput(w) => w,
            Element::Radio(w) => w,
            Element::SelectSlider(w) => w,
            Element::Selectbox(w) => w,
            Element::Slider(w) => w,
            Element::TextArea(w) => w,
            Element::TextInput(w) => w,
            Element::TimeInput(w) => w,
            _ => return None,
        };
        Some(widget)
    }

    pub fn is_widget(&self) -> bool {
        self.as_widget().is_some()
    }

    /// User-assigned key; always `None` for plain elements
    pub fn key(&self) -> Option<&str> {
        self.as_widget().and_then(|w| w.key())
    }

    /// Title, header or subheader
    pub fn as_heading(&self) -> Option<&Heading> {
        match self {
            Element::Title(el) | Element::Header(el) | Element::Subheader(el) => Some(el),
            _ => None,
        }
    }

    /// Markdown, caption, latex or divider
    pub fn as_markdown(&self) -> Option<&Markdown> {
        match self {
            Element::Markdown(el) | Element::Caption(el) | Element::Latex(el) | Element::Divider(el) => {
                Some(el)
            }
            _ => None,
        }
    }

    /// Resolved value as JSON
    pub fn value(&self) -> Result<Value> {
        each_element!(self, el => el.resolve_json())
    }
}

impl ResolveValue for Element {
    type Output = Value;

    fn resolve(&self) -> Result<Value> {
        self.value()
    }

    fn resolve_json(&self) -> Result<Value> {
        self.value()
    }
}

// ============================================================================
// NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Block(Block),
}

impl Node {
    pub fn type_tag(&self) -> &str {
        self.as_ref().type_tag()
    }

    pub fn as_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Element(el) => NodeRef::Element(el),
            Node::Block(block) => NodeRef::Block(block),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        self.as_ref().as_element()
    }

    pub fn as_block(&self) -> Option<&Block> {
        self.as_ref().as_block()
    }

    /// Resolved value as JSON (`null` for blocks)
    pub fn value(&self) -> Result<Value> {
        self.as_ref().value()
    }
}

/// Borrowed view of a node, including the root block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Element(&'a Element),
    Block(&'a Block),
}

impl<'a> NodeRef<'a> {
    pub fn type_tag(&self) -> &'a str {
        match *self {
            NodeRef::Element(el) => el.type_tag(),
            NodeRef::Block(block) => block.type_tag(),
        }
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match *self {
            NodeRef::Element(el) => Some(el),
            NodeRef::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&'a Block> {
        match *self {
            NodeRef::Block(block) => Some(block),
            NodeRef::Element(_) => None,
        }
    }

    pub fn value(&self) -> Result<Value> {
        match *self {
            NodeRef::Element(el) => el.value(),
            NodeRef::Block(_) => Ok(Value::Null),
        }
    }
}

// ============================================================================
// APP TREE
// ============================================================================

/// Tree of one run: root block, its session snapshot and an optional
/// link back to the [`AppTest`] that produced it.
///
/// Derefs to the root [`Block`], so every query accessor is available
/// directly on the tree.
pub struct AppTree {
    root: Block,
    session: Arc<SessionSnapshot>,
    runner: Option<AppTest>,
}

impl AppTree {
    pub(crate) fn new(root: Block, session: Arc<SessionSnapshot>) -> Self {
        Self {
            root,
            session,
            runner: None,
        }
    }

    /// Attach the handle used by [`AppTree::run`]
    pub(crate) fn link(mut self, runner: AppTest) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Linked to an [`AppTest`], i.e. [`AppTree::run`] is available
    pub fn is_linked(&self) -> bool {
        self.runner.is_some()
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    /// Main area; `None` only if a malformed stream replaced it with an element
    pub fn main(&self) -> Option<&Block> {
        self.root.child(0).and_then(Node::as_block)
    }

    pub fn sidebar(&self) -> Option<&Block> {
        self.root.child(1).and_then(Node::as_block)
    }

    /// Session state as of the end of the run that built this tree
    pub fn session_state(&self) -> &SessionSnapshot {
        &self.session
    }

    /// Wire records of every widget that has something to report
    pub fn widget_states(&self) -> Result<WidgetStates> {
        let mut states = WidgetStates::new();
        for node in self.root.iter() {
            let Some(widget) = node.as_element().and_then(Element::as_widget) else {
                continue;
            };
            if let Some(state) = widget.widget_state()? {
                states.push(state);
            }
        }
        Ok(states)
    }

    /// Rerun with this tree's widget states and the default timeout
    pub fn run(&self) -> Result<AppTree> {
        self.rerun(None)
    }

    pub fn run_with_timeout(&self, timeout: Duration) -> Result<AppTree> {
        self.rerun(Some(timeout))
    }

    fn rerun(&self, timeout: Option<Duration>) -> Result<AppTree> {
        let runner = self.runner.as_ref().ok_or(AppTestError::NotLinked)?;
        let states = self.widget_states()?;
        runner.run_with(Some(states), timeout)
    }
}

impl Deref for AppTree {
    type Target = Block;

    fn deref(&self) -> &Block {
        &self.root
    }
}

impl fmt::Debug for AppTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppTree")
            .field("root", &self.root)
            .field("linked", &self.is_linked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{ForwardMsg, TextProto};

    #[test]
    fn test_unlinked_tree_cannot_rerun() {
        let tree = parse_tree_from_messages(&[], Arc::new(SessionSnapshot::new())).unwrap();
        assert!(!tree.is_linked());
        assert!(matches!(tree.run(), Err(AppTestError::NotLinked)));
    }

    #[test]
    fn test_root_slots_present_without_messages() {
        let tree = parse_tree_from_messages(&[], Arc::new(SessionSnapshot::new())).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.main().map(Block::type_tag), Some("main"));
        assert_eq!(tree.sidebar().map(Block::type_tag), Some("sidebar"));
        assert!(tree.widget_states().unwrap().is_empty());
    }

    #[test]
    fn test_node_value_dispatch() {
        let msgs = vec![ForwardMsg::new_element(
            vec![0, 0],
            crate::proto::ElementProto::Text(TextProto {
                body: "hi".into(),
                ..Default::default()
            }),
        )];
        let tree = parse_tree_from_messages(&msgs, Arc::new(SessionSnapshot::new())).unwrap();
        let node = tree.main().and_then(|m| m.child(0)).unwrap();

        assert_eq!(node.type_tag(), "text");
        assert_eq!(node.value().unwrap(), Value::String("hi".into()));
        assert_eq!(node.as_element().and_then(Element::key), None);
        assert_eq!(NodeRef::Block(tree.root()).value().unwrap(), Value::Null);
    }
}
