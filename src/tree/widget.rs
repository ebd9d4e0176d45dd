//! Widget nodes and the tri-state value overlay
//!
//! A widget reports the overlay value when one is set, otherwise the value
//! recorded for its wire id in the session snapshot of the run that built
//! the tree. Overlays use interior mutability so they can be set through
//! the shared references handed out by the query layer.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveTime};
use parking_lot::RwLock;
use serde_json::Value;

use super::ResolveValue;
use crate::codec::WidgetStateCodec;
use crate::engine::user_key_from_widget_id;
use crate::error::{AppTestError, Result};
use crate::proto::{
    ButtonProto, CheckboxProto, ColorPickerProto, DateInputProto, MultiSelectProto,
    NumberInputProto, RadioProto, SelectboxProto, SliderProto, TextAreaProto, TextInputProto,
    TimeInputProto, WidgetMeta,
};
use crate::session::SessionSnapshot;
use crate::value::{format_time, option_index, parse_date, parse_time, DateValue, RangeValue};

// ============================================================================
// OVERLAY
// ============================================================================

/// Caller-set value masking the session-derived one until the next run
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Overlay<V> {
    /// Never interacted with
    #[default]
    NotSet,
    Value(V),
    /// One-shot `true` of a trigger widget
    Triggered,
}

impl<V> Overlay<V> {
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::NotSet)
    }
}

/// Lock-guarded overlay slot
#[derive(Debug)]
pub struct OverlayCell<V>(RwLock<Overlay<V>>);

impl<V> Default for OverlayCell<V> {
    fn default() -> Self {
        Self(RwLock::new(Overlay::NotSet))
    }
}

impl<V: Clone> OverlayCell<V> {
    pub fn get(&self) -> Overlay<V> {
        self.0.read().clone()
    }

    pub fn set(&self, overlay: Overlay<V>) {
        *self.0.write() = overlay;
    }

    pub fn is_set(&self) -> bool {
        self.0.read().is_set()
    }

    pub fn clear(&self) {
        self.set(Overlay::NotSet);
    }
}

impl<V: Clone> Clone for OverlayCell<V> {
    fn clone(&self) -> Self {
        Self(RwLock::new(self.get()))
    }
}

impl<V: PartialEq> PartialEq for OverlayCell<V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || *self.0.read() == *other.0.read()
    }
}

// ============================================================================
// WIDGET CORE
// ============================================================================

/// Overlay plus the session snapshot of the run that produced the widget
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetCore<V> {
    overlay: OverlayCell<V>,
    session: Arc<SessionSnapshot>,
}

impl<V: Clone> WidgetCore<V> {
    pub(crate) fn new(session: Arc<SessionSnapshot>) -> Self {
        Self {
            overlay: OverlayCell::default(),
            session,
        }
    }

    pub fn overlay(&self) -> Overlay<V> {
        self.overlay.get()
    }

    pub(crate) fn set(&self, value: V) {
        self.overlay.set(Overlay::Value(value));
    }

    pub(crate) fn trigger(&self) {
        self.overlay.set(Overlay::Triggered);
    }

    pub(crate) fn clear(&self) {
        self.overlay.clear();
    }

    pub(crate) fn session_value(&self, widget_id: &str) -> Option<&Value> {
        self.session.widget_value(widget_id)
    }

    /// Overlay set, or a session value to fall back on
    pub(crate) fn reportable(&self, widget_id: &str) -> bool {
        self.overlay.is_set() || self.session_value(widget_id).is_some()
    }

    /// Overlay value, else the session value decoded by `decode`.
    ///
    /// `Triggered` decodes as wire `true`.
    fn resolve(
        &self,
        widget_id: &str,
        expected: &str,
        decode: impl Fn(&Value) -> Option<V>,
    ) -> Result<V> {
        let raw = match self.overlay.get() {
            Overlay::Value(value) => return Ok(value),
            Overlay::Triggered => Value::Bool(true),
            Overlay::NotSet => self
                .session_value(widget_id)
                .cloned()
                .ok_or_else(|| AppTestError::StateNotFound {
                    widget_id: widget_id.to_string(),
                })?,
        };
        decode(&raw).ok_or_else(|| AppTestError::StateType {
            widget_id: widget_id.to_string(),
            expected: expected.to_string(),
            details: raw.to_string(),
        })
    }
}

// ============================================================================
// WIDGET TRAIT
// ============================================================================

/// Fields and overlay controls shared by every widget kind
pub trait Widget: WidgetStateCodec {
    fn meta(&self) -> &WidgetMeta;

    /// Node type tag
    fn type_tag(&self) -> &'static str;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn label(&self) -> &str {
        &self.meta().label
    }

    fn help(&self) -> &str {
        &self.meta().help
    }

    /// Enclosing form id ("" outside forms)
    fn form_id(&self) -> &str {
        &self.meta().form_id
    }

    fn disabled(&self) -> bool {
        self.meta().disabled
    }

    /// User-assigned key derived from the wire id
    fn key(&self) -> Option<&str> {
        user_key_from_widget_id(self.id())
    }

    fn has_overlay(&self) -> bool;

    /// Drop any overlay so the widget reports its session value again
    fn clear_overlay(&self);

    /// Raw session value for this widget's wire id
    fn session_value(&self) -> Option<&Value>;
}

macro_rules! impl_widget {
    ($($ty:ident => $tag:literal),* $(,)?) => {
        $(
            impl Widget for $ty {
                fn meta(&self) -> &WidgetMeta {
                    &self.proto.meta
                }

                fn type_tag(&self) -> &'static str {
                    $tag
                }

                fn has_overlay(&self) -> bool {
                    self.core.overlay.is_set()
                }

                fn clear_overlay(&self) {
                    self.core.clear();
                }

                fn session_value(&self) -> Option<&Value> {
                    self.core.session_value(&self.proto.meta.id)
                }
            }

            impl ResolveValue for $ty {
                type Output = <$ty as WidgetValue>::Value;

                fn resolve(&self) -> Result<Self::Output> {
                    self.value()
                }

                fn resolve_json(&self) -> Result<Value> {
                    self.value().map(|v| <$ty as WidgetValue>::to_json(&v))
                }
            }
        )*
    };
}

/// Typed value of one widget kind and its session representation
pub trait WidgetValue {
    type Value;

    fn to_json(value: &Self::Value) -> Value;
}

impl_widget! {
    Button => "button",
    Checkbox => "checkbox",
    ColorPicker => "color_picker",
    DateInput => "date_input",
    Multiselect => "multiselect",
    NumberInput => "number_input",
    Radio => "radio",
    Selectbox => "selectbox",
    Slider => "slider",
    SelectSlider => "select_slider",
    TextArea => "text_area",
    TextInput => "text_input",
    TimeInput => "time_input",
}

fn option_not_found(widget_id: &str, value: &Value) -> AppTestError {
    AppTestError::OptionNotFound {
        widget_id: widget_id.to_string(),
        value: value.to_string(),
    }
}

fn non_null(value: &Value) -> Option<Value> {
    Some(value.clone()).filter(|v| !v.is_null())
}

// ============================================================================
// TRIGGER AND FLAG WIDGETS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub(crate) proto: ButtonProto,
    pub(crate) core: WidgetCore<bool>,
}

impl Button {
    pub(crate) fn new(proto: ButtonProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<bool> {
        self.core.resolve(&self.proto.meta.id, "bool", Value::as_bool)
    }

    pub fn is_form_submitter(&self) -> bool {
        self.proto.is_form_submitter
    }

    pub fn set_value(&self, value: bool) -> &Self {
        self.core.set(value);
        self
    }

    /// Trigger the button for the next run only
    pub fn click(&self) -> &Self {
        self.core.trigger();
        self
    }
}

impl WidgetValue for Button {
    type Value = bool;

    fn to_json(value: &bool) -> Value {
        Value::Bool(*value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkbox {
    pub(crate) proto: CheckboxProto,
    pub(crate) core: WidgetCore<bool>,
}

impl Checkbox {
    pub(crate) fn new(proto: CheckboxProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<bool> {
        self.core.resolve(&self.proto.meta.id, "bool", Value::as_bool)
    }

    pub fn set_value(&self, value: bool) -> &Self {
        self.core.set(value);
        self
    }

    pub fn check(&self) -> &Self {
        self.set_value(true)
    }

    pub fn uncheck(&self) -> &Self {
        self.set_value(false)
    }
}

impl WidgetValue for Checkbox {
    type Value = bool;

    fn to_json(value: &bool) -> Value {
        Value::Bool(*value)
    }
}

// ============================================================================
// FREE-FORM WIDGETS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ColorPicker {
    pub(crate) proto: ColorPickerProto,
    pub(crate) core: WidgetCore<String>,
}

impl ColorPicker {
    pub(crate) fn new(proto: ColorPickerProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    /// Hex color string, e.g. `#ff0000`
    pub fn value(&self) -> Result<String> {
        self.core.resolve(&self.proto.meta.id, "string", |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn set_value(&self, value: impl Into<String>) -> &Self {
        self.core.set(value.into());
        self
    }

    /// Set a hex color; the leading `#` is optional
    pub fn pick(&self, color: &str) -> &Self {
        if color.starts_with('#') {
            self.set_value(color)
        } else {
            self.set_value(format!("#{color}"))
        }
    }
}

impl WidgetValue for ColorPicker {
    type Value = String;

    fn to_json(value: &String) -> Value {
        Value::String(value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberInput {
    pub(crate) proto: NumberInputProto,
    pub(crate) core: WidgetCore<Option<f64>>,
}

impl NumberInput {
    pub(crate) fn new(proto: NumberInputProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    /// `None` when the input is empty
    pub fn value(&self) -> Result<Option<f64>> {
        self.core.resolve(&self.proto.meta.id, "number", |v| match v {
            Value::Null => Some(None),
            other => other.as_f64().map(Some),
        })
    }

    /// Declared lower bound, `None` when unbounded
    pub fn min(&self) -> Option<f64> {
        self.proto.min
    }

    /// Declared upper bound, `None` when unbounded
    pub fn max(&self) -> Option<f64> {
        self.proto.max
    }

    pub fn step(&self) -> f64 {
        self.proto.step
    }

    pub fn format(&self) -> &str {
        &self.proto.format
    }

    pub fn set_value(&self, value: Option<f64>) -> &Self {
        self.core.set(value);
        self
    }

    /// Add one step, clamped to the declared maximum
    pub fn increment(&self) -> Result<&Self> {
        if let Some(current) = self.value()? {
            let next = current + self.proto.step;
            self.set_value(Some(self.max().map_or(next, |max| next.min(max))));
        }
        Ok(self)
    }

    /// Subtract one step, clamped to the declared minimum
    pub fn decrement(&self) -> Result<&Self> {
        if let Some(current) = self.value()? {
            let next = current - self.proto.step;
            self.set_value(Some(self.min().map_or(next, |min| next.max(min))));
        }
        Ok(self)
    }
}

impl WidgetValue for NumberInput {
    type Value = Option<f64>;

    fn to_json(value: &Option<f64>) -> Value {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub(crate) proto: TextInputProto,
    pub(crate) core: WidgetCore<String>,
}

impl TextInput {
    pub(crate) fn new(proto: TextInputProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<String> {
        self.core.resolve(&self.proto.meta.id, "string", |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.proto.max_chars
    }

    pub fn placeholder(&self) -> &str {
        &self.proto.placeholder
    }

    pub fn autocomplete(&self) -> &str {
        &self.proto.autocomplete
    }

    pub fn set_value(&self, value: impl Into<String>) -> &Self {
        self.core.set(value.into());
        self
    }

    /// Type `text` into the input; ignored when longer than `max_chars`
    pub fn input(&self, text: &str) -> &Self {
        if exceeds(self.proto.max_chars, text) {
            return self;
        }
        self.set_value(text)
    }
}

impl WidgetValue for TextInput {
    type Value = String;

    fn to_json(value: &String) -> Value {
        Value::String(value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextArea {
    pub(crate) proto: TextAreaProto,
    pub(crate) core: WidgetCore<String>,
}

impl TextArea {
    pub(crate) fn new(proto: TextAreaProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<String> {
        self.core.resolve(&self.proto.meta.id, "string", |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.proto.max_chars
    }

    pub fn placeholder(&self) -> &str {
        &self.proto.placeholder
    }

    pub fn height(&self) -> Option<u32> {
        self.proto.height
    }

    pub fn set_value(&self, value: impl Into<String>) -> &Self {
        self.core.set(value.into());
        self
    }

    /// Type `text` into the area; ignored when longer than `max_chars`
    pub fn input(&self, text: &str) -> &Self {
        if exceeds(self.proto.max_chars, text) {
            return self;
        }
        self.set_value(text)
    }
}

impl WidgetValue for TextArea {
    type Value = String;

    fn to_json(value: &String) -> Value {
        Value::String(value.clone())
    }
}

fn exceeds(max_chars: Option<usize>, text: &str) -> bool {
    max_chars.is_some_and(|max| max > 0 && text.chars().count() > max)
}

// ============================================================================
// DATE AND TIME
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DateInput {
    pub(crate) proto: DateInputProto,
    pub(crate) core: WidgetCore<DateValue>,
}

impl DateInput {
    pub(crate) fn new(proto: DateInputProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<DateValue> {
        self.core.resolve(&self.proto.meta.id, "date", DateValue::from_json)
    }

    pub fn min(&self) -> Option<chrono::NaiveDate> {
        parse_date(&self.proto.min)
    }

    pub fn max(&self) -> Option<chrono::NaiveDate> {
        parse_date(&self.proto.max)
    }

    pub fn is_range(&self) -> bool {
        self.proto.is_range
    }

    pub fn set_value(&self, value: impl Into<DateValue>) -> &Self {
        self.core.set(value.into());
        self
    }
}

impl WidgetValue for DateInput {
    type Value = DateValue;

    fn to_json(value: &DateValue) -> Value {
        value.to_json()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeInput {
    pub(crate) proto: TimeInputProto,
    pub(crate) core: WidgetCore<NaiveTime>,
}

impl TimeInput {
    pub(crate) fn new(proto: TimeInputProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<NaiveTime> {
        self.core
            .resolve(&self.proto.meta.id, "time", |v| v.as_str().and_then(parse_time))
    }

    /// Step between selectable times, in seconds
    pub fn step(&self) -> u32 {
        self.proto.step
    }

    pub fn set_value(&self, value: NaiveTime) -> &Self {
        self.core.set(value);
        self
    }

    /// Next selectable time (wraps at midnight)
    pub fn increment(&self) -> Result<&Self> {
        let next = self.value()? + ChronoDuration::seconds(i64::from(self.proto.step));
        Ok(self.set_value(next))
    }

    pub fn decrement(&self) -> Result<&Self> {
        let prev = self.value()? - ChronoDuration::seconds(i64::from(self.proto.step));
        Ok(self.set_value(prev))
    }
}

impl WidgetValue for TimeInput {
    type Value = NaiveTime;

    fn to_json(value: &NaiveTime) -> Value {
        Value::String(format_time(*value))
    }
}

// ============================================================================
// SELECTION WIDGETS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Radio {
    pub(crate) proto: RadioProto,
    pub(crate) core: WidgetCore<Option<Value>>,
}

impl Radio {
    pub(crate) fn new(proto: RadioProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    /// Selected option, `None` when nothing is selected
    pub fn value(&self) -> Result<Option<Value>> {
        self.core
            .resolve(&self.proto.meta.id, "option", |v| Some(non_null(v)))
    }

    pub fn options(&self) -> &[String] {
        &self.proto.options
    }

    pub fn horizontal(&self) -> bool {
        self.proto.horizontal
    }

    /// Position of the selected value within `options`
    pub fn index(&self) -> Result<Option<usize>> {
        match self.value()? {
            None => Ok(None),
            Some(value) => option_index(&self.proto.options, &value)
                .map(Some)
                .ok_or_else(|| option_not_found(&self.proto.meta.id, &value)),
        }
    }

    pub fn set_value(&self, value: impl Into<Value>) -> &Self {
        self.core.set(non_null(&value.into()));
        self
    }
}

impl WidgetValue for Radio {
    type Value = Option<Value>;

    fn to_json(value: &Option<Value>) -> Value {
        value.clone().unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selectbox {
    pub(crate) proto: SelectboxProto,
    pub(crate) core: WidgetCore<Option<Value>>,
}

impl Selectbox {
    pub(crate) fn new(proto: SelectboxProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<Option<Value>> {
        self.core
            .resolve(&self.proto.meta.id, "option", |v| Some(non_null(v)))
    }

    pub fn options(&self) -> &[String] {
        &self.proto.options
    }

    pub fn placeholder(&self) -> &str {
        &self.proto.placeholder
    }

    pub fn index(&self) -> Result<Option<usize>> {
        match self.value()? {
            None => Ok(None),
            Some(value) => option_index(&self.proto.options, &value)
                .map(Some)
                .ok_or_else(|| option_not_found(&self.proto.meta.id, &value)),
        }
    }

    pub fn set_value(&self, value: impl Into<Value>) -> &Self {
        self.core.set(non_null(&value.into()));
        self
    }

    pub fn select(&self, value: impl Into<Value>) -> &Self {
        self.set_value(value)
    }

    /// Select by position; an out-of-range index clears the selection
    pub fn select_index(&self, index: Option<usize>) -> &Self {
        let option = index
            .and_then(|idx| self.proto.options.get(idx))
            .map(|label| Value::String(label.clone()));
        self.core.set(option);
        self
    }
}

impl WidgetValue for Selectbox {
    type Value = Option<Value>;

    fn to_json(value: &Option<Value>) -> Value {
        value.clone().unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Multiselect {
    pub(crate) proto: MultiSelectProto,
    pub(crate) core: WidgetCore<Vec<Value>>,
}

impl Multiselect {
    pub(crate) fn new(proto: MultiSelectProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<Vec<Value>> {
        self.core
            .resolve(&self.proto.meta.id, "array", |v| v.as_array().cloned())
    }

    pub fn options(&self) -> &[String] {
        &self.proto.options
    }

    /// `None` means unlimited
    pub fn max_selections(&self) -> Option<u32> {
        self.proto.max_selections
    }

    /// Positions of the selected values within `options`
    pub fn indices(&self) -> Result<Vec<usize>> {
        self.value()?
            .iter()
            .map(|value| {
                option_index(&self.proto.options, value)
                    .ok_or_else(|| option_not_found(&self.proto.meta.id, value))
            })
            .collect()
    }

    pub fn set_value(&self, values: Vec<Value>) -> &Self {
        self.core.set(values);
        self
    }

    /// Add `value` to the selection unless already selected
    pub fn select(&self, value: impl Into<Value>) -> Result<&Self> {
        let value = value.into();
        let mut current = self.value()?;
        if !current.contains(&value) {
            current.push(value);
            self.set_value(current);
        }
        Ok(self)
    }

    /// Remove every occurrence of `value` from the selection
    pub fn unselect(&self, value: impl Into<Value>) -> Result<&Self> {
        let value = value.into();
        let mut current = self.value()?;
        if current.contains(&value) {
            current.retain(|v| *v != value);
            self.set_value(current);
        }
        Ok(self)
    }
}

impl WidgetValue for Multiselect {
    type Value = Vec<Value>;

    fn to_json(value: &Vec<Value>) -> Value {
        Value::Array(value.clone())
    }
}

// ============================================================================
// SLIDERS
// ============================================================================

/// Numeric slider (`slider_type` 1); scalar or range per declared default
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub(crate) proto: SliderProto,
    pub(crate) core: WidgetCore<RangeValue<f64>>,
}

impl Slider {
    pub(crate) fn new(proto: SliderProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<RangeValue<f64>> {
        self.core
            .resolve(&self.proto.meta.id, "number or pair", RangeValue::<f64>::from_json)
    }

    pub fn min(&self) -> f64 {
        self.proto.min
    }

    pub fn max(&self) -> f64 {
        self.proto.max
    }

    pub fn step(&self) -> f64 {
        self.proto.step
    }

    /// Declared as a range slider (two handles)
    pub fn is_range(&self) -> bool {
        self.proto.default.len() == 2
    }

    pub fn set_value(&self, value: RangeValue<f64>) -> &Self {
        self.core.set(value);
        self
    }

    pub fn set_range(&self, lower: f64, upper: f64) -> &Self {
        self.set_value(RangeValue::Range(lower, upper))
    }
}

impl WidgetValue for Slider {
    type Value = RangeValue<f64>;

    fn to_json(value: &RangeValue<f64>) -> Value {
        value.to_json()
    }
}

/// Slider over a list of options (`slider_type` 2)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectSlider {
    pub(crate) proto: SliderProto,
    pub(crate) core: WidgetCore<RangeValue<Value>>,
}

impl SelectSlider {
    pub(crate) fn new(proto: SliderProto, session: Arc<SessionSnapshot>) -> Self {
        Self {
            proto,
            core: WidgetCore::new(session),
        }
    }

    pub fn value(&self) -> Result<RangeValue<Value>> {
        let is_range = self.is_range();
        self.core.resolve(&self.proto.meta.id, "option or pair", |v| {
            match (is_range, v) {
                (true, Value::Array(items)) if items.len() == 2 => {
                    Some(RangeValue::Range(items[0].clone(), items[1].clone()))
                }
                (true, _) => None,
                (false, other) => Some(RangeValue::Single(other.clone())),
            }
        })
    }

    pub fn options(&self) -> &[String] {
        &self.proto.options
    }

    pub fn is_range(&self) -> bool {
        self.proto.default.len() == 2
    }

    pub fn set_value(&self, value: RangeValue<Value>) -> &Self {
        self.core.set(value);
        self
    }

    pub fn set_range(&self, lower: impl Into<Value>, upper: impl Into<Value>) -> &Self {
        self.set_value(RangeValue::Range(lower.into(), upper.into()))
    }
}

impl WidgetValue for SelectSlider {
    type Value = RangeValue<Value>;

    fn to_json(value: &RangeValue<Value>) -> Value {
        value.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    const RADIO_ID: &str = "$$WIDGET_ID-aa-pick";

    fn radio(session: SessionSnapshot) -> Radio {
        let proto = RadioProto {
            meta: WidgetMeta::new(RADIO_ID, "pick"),
            default: Some(0),
            options: vec!["a".into(), "b".into(), "c".into()],
            horizontal: false,
        };
        Radio::new(proto, Arc::new(session))
    }

    #[test]
    fn test_overlay_masks_session_value() {
        let r = radio(SessionSnapshot::new().with_widget(RADIO_ID, json!("a")));
        assert_eq!(r.value().unwrap(), Some(json!("a")));
        assert!(!r.has_overlay());

        r.set_value("c");
        assert_eq!(r.value().unwrap(), Some(json!("c")));
        assert_eq!(r.index().unwrap(), Some(2));

        r.clear_overlay();
        assert_eq!(r.value().unwrap(), Some(json!("a")));
    }

    #[test]
    fn test_missing_session_value_is_error() {
        let r = radio(SessionSnapshot::new());
        assert!(matches!(r.value(), Err(AppTestError::StateNotFound { .. })));
    }

    #[test]
    fn test_index_of_unknown_option_fails() {
        let r = radio(SessionSnapshot::new());
        r.set_value("z");
        assert!(matches!(r.index(), Err(AppTestError::OptionNotFound { .. })));
    }

    #[test]
    fn test_key_from_wire_id() {
        let r = radio(SessionSnapshot::new());
        assert_eq!(r.key(), Some("pick"));
        assert_eq!(r.type_tag(), "radio");
    }

    #[test]
    fn test_overlay_cell_equality() {
        let a = OverlayCell::<bool>::default();
        let b = OverlayCell::<bool>::default();
        assert_eq!(a, a);
        assert_eq!(a, b);
        b.set(Overlay::Triggered);
        assert_ne!(a, b);
        assert_eq!(b.clone().get(), Overlay::Triggered);
    }

    #[test]
    fn test_button_click_resolves_true() {
        let id = "$$WIDGET_ID-bb-None";
        let button = Button::new(
            ButtonProto {
                meta: WidgetMeta::new(id, "go"),
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!(false))),
        );
        assert!(!button.value().unwrap());
        button.click();
        assert!(button.value().unwrap());
        assert_eq!(button.core.overlay(), Overlay::Triggered);
    }

    #[test]
    fn test_number_input_clamps_to_bounds() {
        let id = "$$WIDGET_ID-cc-None";
        let number = NumberInput::new(
            NumberInputProto {
                meta: WidgetMeta::new(id, "n"),
                max: Some(10.0),
                step: 3.0,
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!(9.0))),
        );
        number.increment().unwrap();
        assert_eq!(number.value().unwrap(), Some(10.0));
        number.decrement().unwrap();
        number.decrement().unwrap();
        assert_eq!(number.value().unwrap(), Some(4.0));
    }

    #[test]
    fn test_text_input_respects_max_chars() {
        let id = "$$WIDGET_ID-dd-None";
        let text = TextInput::new(
            TextInputProto {
                meta: WidgetMeta::new(id, "t"),
                max_chars: Some(3),
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!(""))),
        );
        text.input("toolong");
        assert_eq!(text.value().unwrap(), "");
        text.input("ok");
        assert_eq!(text.value().unwrap(), "ok");
    }

    #[test]
    fn test_time_input_steps() {
        let id = "$$WIDGET_ID-ee-None";
        let time = TimeInput::new(
            TimeInputProto {
                meta: WidgetMeta::new(id, "t"),
                default: Some("08:45".into()),
                step: 900,
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!("08:45"))),
        );
        time.increment().unwrap();
        assert_eq!(time.value().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        time.decrement().unwrap().decrement().unwrap();
        assert_eq!(time.value().unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn test_multiselect_select_unselect() {
        let id = "$$WIDGET_ID-ff-None";
        let multi = Multiselect::new(
            MultiSelectProto {
                meta: WidgetMeta::new(id, "m"),
                options: vec!["x".into(), "y".into()],
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!(["x"]))),
        );
        multi.select("y").unwrap();
        multi.select("y").unwrap();
        assert_eq!(multi.value().unwrap(), vec![json!("x"), json!("y")]);
        assert_eq!(multi.indices().unwrap(), vec![0, 1]);
        multi.unselect("x").unwrap();
        assert_eq!(multi.value().unwrap(), vec![json!("y")]);
    }

    #[test]
    fn test_color_picker_adds_hash() {
        let picker = ColorPicker::new(
            ColorPickerProto {
                meta: WidgetMeta::new("c", "color"),
                default: "#000000".into(),
            },
            Arc::new(SessionSnapshot::new()),
        );
        picker.pick("ff0000");
        assert_eq!(picker.value().unwrap(), "#ff0000");
    }

    #[test]
    fn test_date_input_session_decoding() {
        let id = "$$WIDGET_ID-gg-None";
        let date = DateInput::new(
            DateInputProto {
                meta: WidgetMeta::new(id, "d"),
                min: "2024-01-01".into(),
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!("2024-03-01"))),
        );
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(date.value().unwrap(), DateValue::Single(day));
        assert_eq!(date.min(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(date.max(), None);
    }

    #[test]
    fn test_select_slider_range_shape() {
        let id = "$$WIDGET_ID-hh-None";
        let slider = SelectSlider::new(
            SliderProto {
                meta: WidgetMeta::new(id, "s"),
                default: vec![0.0, 1.0],
                options: vec!["lo".into(), "mid".into(), "hi".into()],
                slider_type: 2,
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new().with_widget(id, json!(["lo", "mid"]))),
        );
        assert!(slider.is_range());
        assert_eq!(
            slider.value().unwrap(),
            RangeValue::Range(json!("lo"), json!("mid"))
        );
        slider.set_range("mid", "hi");
        assert_eq!(slider.value().unwrap(), RangeValue::Range(json!("mid"), json!("hi")));
    }

    /// Overlay value type without `Default`
    #[derive(Debug, Clone, PartialEq)]
    struct Marker(u8);

    #[test]
    fn test_core_needs_no_default_value() {
        let core: WidgetCore<Marker> = WidgetCore::new(Arc::new(SessionSnapshot::new()));
        assert_eq!(core.overlay(), Overlay::NotSet);

        core.set(Marker(7));
        let copy = core.clone();
        assert_eq!(copy, core);
        assert_eq!(copy.overlay(), Overlay::Value(Marker(7)));

        copy.clear();
        assert_ne!(copy, core);
    }
}
