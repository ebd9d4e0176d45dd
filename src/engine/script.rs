//! Script-side API of the local engine
//!
//! A script is a Rust closure receiving a [`ScriptContext`]. Every call on
//! the context appends a [`ForwardMsg`] to the run's queue at the next
//! position of the current container, and widget calls return the widget's
//! value for this run.
//!
//! Widget value resolution, first match wins:
//! 1. the widget state sent with the rerun
//! 2. the value the widget had at the end of the previous run
//! 3. the declared default
//!
//! Trigger widgets (buttons) skip step 2: a click lasts one run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveTime;
use parking_lot::Mutex;
use serde_json::{json, Value};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use super::{EngineResources, UploadedFile, GENERATED_WIDGET_ID_PREFIX};
use crate::proto::{
    BlockProto, ButtonProto, CheckboxProto, CodeProto, ColorPickerProto, ColumnBlock,
    DataFrameProto, DateInputProto, ElementProto, ExceptionProto, ExpandableBlock, FormBlock,
    ForwardMsg, HeadingProto, HeadingTag, HorizontalBlock, JsonProto, MarkdownProto,
    MarkdownType, MultiSelectProto, NewElement, NumberInputProto, RadioProto, SelectboxProto,
    SliderProto, SliderType, TabBlock, TableData, TextAreaProto, TextInputProto, TextProto,
    TimeInputProto, VerticalBlock, WidgetMeta, WidgetStateValue, WidgetStates,
};
use crate::value::{format_time, option_index, option_label, parse_time, DateValue, RangeValue};

/// Granularity of stop checks while a script sleeps
const SLEEP_SLICE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// Script could not be loaded; the run ends with a compile error
    #[error("compile error: {0}")]
    Compile(String),

    /// Uncaught script failure, rendered as an exception element
    #[error("{0}")]
    Runtime(String),

    #[error("duplicate widget id '{0}': give each widget a unique key")]
    DuplicateWidgetId(String),

    /// The engine asked the run to stop
    #[error("script stopped")]
    Stopped,
}

impl ScriptError {
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    /// Exception type name shown in the rendered error element
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Compile(_) => "CompileError",
            Self::Runtime(_) => "RuntimeError",
            Self::DuplicateWidgetId(_) => "DuplicateWidgetID",
            Self::Stopped => "StopException",
        }
    }
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// A user script run by [`LocalScriptEngine`](super::LocalScriptEngine)
pub type Script = Arc<dyn Fn(&mut ScriptContext) -> ScriptResult<()> + Send + Sync>;

/// Deterministic wire id: `$$WIDGET_ID-<xxh3 of kind/label/key>-<key or None>`
pub fn compute_widget_id(kind: &str, label: &str, key: Option<&str>) -> String {
    let seed = format!("{kind}\u{1f}{label}\u{1f}{}", key.unwrap_or_default());
    format!(
        "{}-{:016x}-{}",
        GENERATED_WIDGET_ID_PREFIX,
        xxh3_64(seed.as_bytes()),
        key.unwrap_or("None")
    )
}

/// Next free position inside one container
#[derive(Debug, Clone)]
struct Cursor {
    path: Vec<usize>,
    next: usize,
}

impl Cursor {
    fn at(path: Vec<usize>) -> Self {
        Self { path, next: 0 }
    }

    fn advance(&mut self) -> Vec<usize> {
        let mut path = self.path.clone();
        path.push(self.next);
        self.next += 1;
        path
    }
}

pub struct ScriptContext {
    current: Cursor,
    sidebar: Cursor,
    /// Enclosing form ("" outside forms)
    form_id: String,
    queue: Arc<Mutex<Vec<ForwardMsg>>>,
    incoming: WidgetStates,
    previous: HashMap<String, Value>,
    /// Widgets declared by this run
    widgets: HashMap<String, Value>,
    user: HashMap<String, Value>,
    stop: Arc<AtomicBool>,
    resources: EngineResources,
}

impl ScriptContext {
    pub(super) fn new(
        queue: Arc<Mutex<Vec<ForwardMsg>>>,
        stop: Arc<AtomicBool>,
        resources: EngineResources,
        incoming: Option<WidgetStates>,
        previous: HashMap<String, Value>,
        user: HashMap<String, Value>,
    ) -> Self {
        Self {
            current: Cursor::at(vec![0]),
            sidebar: Cursor::at(vec![1]),
            form_id: String::new(),
            queue,
            incoming: incoming.unwrap_or_default(),
            previous,
            widgets: HashMap::new(),
            user,
            stop,
            resources,
        }
    }

    /// Widget values declared by this run and user-set values
    pub(super) fn into_state(self) -> (HashMap<String, Value>, HashMap<String, Value>) {
        (self.widgets, self.user)
    }

    /// Render a script error without consulting the stop flag
    pub(super) fn report_error(&mut self, error: &ScriptError) {
        let proto = ElementProto::Exception(ExceptionProto {
            type_name: error.type_name().to_string(),
            message: error.to_string(),
            ..Default::default()
        });
        self.push_element(proto);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn checkpoint(&self) -> ScriptResult<()> {
        if self.stop_requested() {
            return Err(ScriptError::Stopped);
        }
        Ok(())
    }

    fn push_element(&mut self, element: impl Into<NewElement>) {
        let path = self.current.advance();
        self.queue.lock().push(ForwardMsg::new_element(path, element));
    }

    fn emit(&mut self, element: impl Into<NewElement>) -> ScriptResult<()> {
        self.checkpoint()?;
        self.push_element(element);
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════
    // Elements
    // ════════════════════════════════════════════════════════════════════

    /// Emit any element payload, including kinds without a dedicated call
    pub fn element(&mut self, element: impl Into<NewElement>) -> ScriptResult<()> {
        self.emit(element)
    }

    pub fn text(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.emit(ElementProto::Text(TextProto {
            body: body.into(),
            ..Default::default()
        }))
    }

    fn markdown_of(&mut self, kind: MarkdownType, body: String) -> ScriptResult<()> {
        self.emit(ElementProto::Markdown(MarkdownProto {
            body,
            is_caption: kind == MarkdownType::Caption,
            element_type: kind.as_wire(),
            ..Default::default()
        }))
    }

    pub fn markdown(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.markdown_of(MarkdownType::Native, body.into())
    }

    pub fn caption(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.markdown_of(MarkdownType::Caption, body.into())
    }

    pub fn latex(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.markdown_of(MarkdownType::Latex, format!("$$\n{}\n$$", body.into()))
    }

    pub fn divider(&mut self) -> ScriptResult<()> {
        self.markdown_of(MarkdownType::Divider, "---".to_string())
    }

    fn heading(&mut self, tag: HeadingTag, body: String) -> ScriptResult<()> {
        self.emit(ElementProto::Heading(HeadingProto {
            tag: tag.as_wire().to_string(),
            body,
            ..Default::default()
        }))
    }

    pub fn title(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.heading(HeadingTag::Title, body.into())
    }

    pub fn header(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.heading(HeadingTag::Header, body.into())
    }

    pub fn subheader(&mut self, body: impl Into<String>) -> ScriptResult<()> {
        self.heading(HeadingTag::Subheader, body.into())
    }

    pub fn code(&mut self, code_text: impl Into<String>, language: &str) -> ScriptResult<()> {
        self.emit(ElementProto::Code(CodeProto {
            code_text: code_text.into(),
            language: language.to_string(),
            ..Default::default()
        }))
    }

    pub fn json(&mut self, value: &Value) -> ScriptResult<()> {
        self.emit(ElementProto::Json(JsonProto {
            body: value.to_string(),
            expanded: true,
        }))
    }

    pub fn exception(&mut self, type_name: &str, message: impl Into<String>) -> ScriptResult<()> {
        self.emit(ElementProto::Exception(ExceptionProto {
            type_name: type_name.to_string(),
            message: message.into(),
            ..Default::default()
        }))
    }

    pub fn dataframe(&mut self, data: TableData) -> ScriptResult<()> {
        self.emit(ElementProto::ArrowDataFrame(DataFrameProto { data }))
    }

    // ════════════════════════════════════════════════════════════════════
    // Containers
    // ════════════════════════════════════════════════════════════════════

    fn block<T>(
        &mut self,
        proto: BlockProto,
        body: impl FnOnce(&mut Self) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        self.checkpoint()?;
        let path = self.current.advance();
        self.queue.lock().push(ForwardMsg::add_block(path.clone(), proto));

        let parent = std::mem::replace(&mut self.current, Cursor::at(path));
        let result = body(self);
        self.current = parent;
        result
    }

    pub fn container<T>(&mut self, body: impl FnOnce(&mut Self) -> ScriptResult<T>) -> ScriptResult<T> {
        self.block(BlockProto::Vertical(VerticalBlock::default()), body)
    }

    pub fn expander<T>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        let proto = BlockProto::Expandable(ExpandableBlock {
            label: label.to_string(),
            expanded: false,
        });
        self.block(proto, body)
    }

    /// Widgets declared inside `body` carry `form_id`
    pub fn form<T>(
        &mut self,
        form_id: &str,
        body: impl FnOnce(&mut Self) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        let proto = BlockProto::Form(FormBlock {
            form_id: form_id.to_string(),
            clear_on_submit: false,
        });
        let outer = std::mem::replace(&mut self.form_id, form_id.to_string());
        let result = self.block(proto, body);
        self.form_id = outer;
        result
    }

    /// `count` equal-width columns; `body` is called once per column index
    pub fn columns(
        &mut self,
        count: usize,
        mut body: impl FnMut(usize, &mut Self) -> ScriptResult<()>,
    ) -> ScriptResult<()> {
        let weight = 1.0 / count.max(1) as f64;
        self.block(BlockProto::Horizontal(HorizontalBlock::default()), |ctx| {
            for idx in 0..count {
                let column = BlockProto::Column(ColumnBlock {
                    weight,
                    ..Default::default()
                });
                ctx.block(column, |ctx| body(idx, ctx))?;
            }
            Ok(())
        })
    }

    /// One tab per label; `body` is called once per tab index
    pub fn tabs(
        &mut self,
        labels: &[&str],
        mut body: impl FnMut(usize, &mut Self) -> ScriptResult<()>,
    ) -> ScriptResult<()> {
        self.block(BlockProto::TabContainer, |ctx| {
            for (idx, label) in labels.iter().enumerate() {
                let tab = BlockProto::Tab(TabBlock {
                    label: label.to_string(),
                });
                ctx.block(tab, |ctx| body(idx, ctx))?;
            }
            Ok(())
        })
    }

    /// Emit into the sidebar instead of the current container
    pub fn sidebar<T>(&mut self, body: impl FnOnce(&mut Self) -> ScriptResult<T>) -> ScriptResult<T> {
        let sidebar = std::mem::replace(&mut self.sidebar, Cursor::at(Vec::new()));
        let outer = std::mem::replace(&mut self.current, sidebar);
        let result = body(self);
        self.sidebar = std::mem::replace(&mut self.current, outer);
        result
    }

    // ════════════════════════════════════════════════════════════════════
    // Widgets
    // ════════════════════════════════════════════════════════════════════

    fn meta(&self, kind: &str, label: &str, key: Option<&str>) -> WidgetMeta {
        WidgetMeta {
            id: compute_widget_id(kind, label, key),
            label: label.to_string(),
            form_id: self.form_id.clone(),
            ..Default::default()
        }
    }

    /// Record the widget for this run and resolve its value
    fn register(
        &mut self,
        id: &str,
        default: Value,
        trigger: bool,
        decode: impl FnOnce(&WidgetStateValue) -> Option<Value>,
    ) -> ScriptResult<Value> {
        self.checkpoint()?;
        if self.widgets.contains_key(id) {
            return Err(ScriptError::DuplicateWidgetId(id.to_string()));
        }

        let mut value = self.incoming.get(id).and_then(decode);
        if value.is_none() && !trigger {
            value = self.previous.get(id).cloned();
        }
        let value = value.unwrap_or(default);

        self.widgets.insert(id.to_string(), value.clone());
        Ok(value)
    }

    pub fn button(&mut self, label: &str, key: Option<&str>) -> ScriptResult<bool> {
        let meta = self.meta("button", label, key);
        let value = self.register(&meta.id, json!(false), true, |state| match state {
            WidgetStateValue::TriggerValue(clicked) => Some(json!(clicked)),
            _ => None,
        })?;
        self.emit(ElementProto::Button(ButtonProto {
            meta,
            default: false,
            is_form_submitter: false,
        }))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub fn checkbox(&mut self, label: &str, default: bool, key: Option<&str>) -> ScriptResult<bool> {
        let meta = self.meta("checkbox", label, key);
        let value = self.register(&meta.id, json!(default), false, |state| match state {
            WidgetStateValue::BoolValue(checked) => Some(json!(checked)),
            _ => None,
        })?;
        self.emit(ElementProto::Checkbox(CheckboxProto { meta, default }))?;
        Ok(value.as_bool().unwrap_or(default))
    }

    pub fn color_picker(
        &mut self,
        label: &str,
        default: &str,
        key: Option<&str>,
    ) -> ScriptResult<String> {
        let meta = self.meta("color_picker", label, key);
        let value = self.register(&meta.id, json!(default), false, |state| match state {
            WidgetStateValue::StringValue(color) => Some(json!(color)),
            _ => None,
        })?;
        self.emit(ElementProto::ColorPicker(ColorPickerProto {
            meta,
            default: default.to_string(),
        }))?;
        Ok(value.as_str().unwrap_or(default).to_string())
    }

    pub fn date_input(
        &mut self,
        label: &str,
        default: impl Into<DateValue>,
        key: Option<&str>,
    ) -> ScriptResult<DateValue> {
        let default = default.into();
        let is_range = matches!(default, DateValue::Range(_));
        let meta = self.meta("date_input", label, key);
        let value = self.register(&meta.id, default.to_json(), false, |state| match state {
            WidgetStateValue::StringArrayValue(dates) if is_range => Some(json!(dates)),
            WidgetStateValue::StringArrayValue(dates) => dates.first().map(|d| json!(d)),
            _ => None,
        })?;
        let wire_default = match default.to_json() {
            Value::String(date) => vec![date],
            other => serde_json::from_value(other).unwrap_or_default(),
        };
        self.emit(ElementProto::DateInput(DateInputProto {
            meta,
            default: wire_default,
            is_range,
            ..Default::default()
        }))?;
        Ok(DateValue::from_json(&value).unwrap_or(default))
    }

    pub fn multiselect(
        &mut self,
        label: &str,
        options: &[Value],
        default: &[Value],
        key: Option<&str>,
    ) -> ScriptResult<Vec<Value>> {
        let meta = self.meta("multiselect", label, key);
        let labels: Vec<String> = options.iter().map(option_label).collect();
        let value = self.register(&meta.id, Value::Array(default.to_vec()), false, |state| {
            match state {
                WidgetStateValue::IntArrayValue(indices) => indices
                    .iter()
                    .map(|idx| option_at(options, *idx))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array),
                _ => None,
            }
        })?;
        let default_indices = default
            .iter()
            .filter_map(|v| option_index(&labels, v))
            .map(|idx| idx as i64)
            .collect();
        self.emit(ElementProto::Multiselect(MultiSelectProto {
            meta,
            default: default_indices,
            options: labels,
            max_selections: None,
        }))?;
        Ok(value.as_array().cloned().unwrap_or_default())
    }

    pub fn number_input(
        &mut self,
        label: &str,
        default: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
        key: Option<&str>,
    ) -> ScriptResult<Option<f64>> {
        let meta = self.meta("number_input", label, key);
        let initial = default.map(Value::from).unwrap_or(Value::Null);
        let value = self.register(&meta.id, initial, false, |state| match state {
            WidgetStateValue::DoubleValue(n) => Some(json!(n)),
            WidgetStateValue::IntValue(n) => Some(json!(*n as f64)),
            _ => None,
        })?;
        self.emit(ElementProto::NumberInput(NumberInputProto {
            meta,
            default,
            min,
            max,
            step,
            ..Default::default()
        }))?;
        Ok(value.as_f64())
    }

    fn single_select(
        &mut self,
        kind: &str,
        label: &str,
        options: &[Value],
        index: Option<usize>,
        key: Option<&str>,
    ) -> ScriptResult<(WidgetMeta, Value)> {
        let meta = self.meta(kind, label, key);
        let initial = index
            .and_then(|idx| options.get(idx).cloned())
            .unwrap_or(Value::Null);
        let value = self.register(&meta.id, initial, false, |state| match state {
            WidgetStateValue::IntValue(idx) => option_at(options, *idx),
            _ => None,
        })?;
        Ok((meta, value))
    }

    pub fn radio(
        &mut self,
        label: &str,
        options: &[Value],
        index: Option<usize>,
        key: Option<&str>,
    ) -> ScriptResult<Option<Value>> {
        let (meta, value) = self.single_select("radio", label, options, index, key)?;
        self.emit(ElementProto::Radio(RadioProto {
            meta,
            default: index.map(|idx| idx as i64),
            options: options.iter().map(option_label).collect(),
            horizontal: false,
        }))?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    pub fn selectbox(
        &mut self,
        label: &str,
        options: &[Value],
        index: Option<usize>,
        key: Option<&str>,
    ) -> ScriptResult<Option<Value>> {
        let (meta, value) = self.single_select("selectbox", label, options, index, key)?;
        self.emit(ElementProto::Selectbox(SelectboxProto {
            meta,
            default: index.map(|idx| idx as i64),
            options: options.iter().map(option_label).collect(),
            placeholder: String::new(),
        }))?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    /// Numeric slider; a `Range` default declares a range slider
    pub fn slider(
        &mut self,
        label: &str,
        min: f64,
        max: f64,
        default: RangeValue<f64>,
        step: f64,
        key: Option<&str>,
    ) -> ScriptResult<RangeValue<f64>> {
        let meta = self.meta("slider", label, key);
        let arity = default.arity();
        let value = self.register(&meta.id, default.to_json(), false, |state| match state {
            WidgetStateValue::DoubleArrayValue(values) => RangeValue::from_slice(values)
                .filter(|v| v.arity() == arity)
                .map(|v| v.to_json()),
            _ => None,
        })?;
        self.emit(ElementProto::Slider(SliderProto {
            meta,
            default: default.as_slice_vec().into_iter().copied().collect(),
            min,
            max,
            step,
            slider_type: SliderType::Slider.as_wire(),
            ..Default::default()
        }))?;
        Ok(RangeValue::<f64>::from_json(&value).unwrap_or(default))
    }

    /// Slider over a list of options; a `Range` default declares a range
    pub fn select_slider(
        &mut self,
        label: &str,
        options: &[Value],
        default: RangeValue<Value>,
        key: Option<&str>,
    ) -> ScriptResult<RangeValue<Value>> {
        let meta = self.meta("select_slider", label, key);
        let labels: Vec<String> = options.iter().map(option_label).collect();
        let arity = default.arity();
        let value = self.register(&meta.id, default.to_json(), false, |state| match state {
            WidgetStateValue::DoubleArrayValue(indices) if indices.len() == arity => {
                let picked = indices
                    .iter()
                    .map(|idx| option_at(options, *idx as i64))
                    .collect::<Option<Vec<_>>>()?;
                match picked.as_slice() {
                    [single] => Some(single.clone()),
                    _ => Some(Value::Array(picked)),
                }
            }
            _ => None,
        })?;
        let default_indices = default
            .as_slice_vec()
            .into_iter()
            .filter_map(|v| option_index(&labels, v))
            .map(|idx| idx as f64)
            .collect();
        self.emit(ElementProto::Slider(SliderProto {
            meta,
            default: default_indices,
            max: options.len().saturating_sub(1) as f64,
            step: 1.0,
            options: labels,
            slider_type: SliderType::SelectSlider.as_wire(),
            ..Default::default()
        }))?;
        Ok(match (arity, value) {
            (2, Value::Array(items)) if items.len() == 2 => {
                RangeValue::Range(items[0].clone(), items[1].clone())
            }
            (_, other) => RangeValue::Single(other),
        })
    }

    fn text_value(
        &mut self,
        id: &str,
        default: &str,
        max_chars: Option<usize>,
    ) -> ScriptResult<String> {
        let value = self.register(id, json!(default), false, |state| match state {
            WidgetStateValue::StringValue(text)
                if max_chars.map_or(true, |max| text.chars().count() <= max) =>
            {
                Some(json!(text))
            }
            _ => None,
        })?;
        Ok(value.as_str().unwrap_or(default).to_string())
    }

    pub fn text_input(
        &mut self,
        label: &str,
        default: &str,
        max_chars: Option<usize>,
        key: Option<&str>,
    ) -> ScriptResult<String> {
        let meta = self.meta("text_input", label, key);
        let value = self.text_value(&meta.id, default, max_chars)?;
        self.emit(ElementProto::TextInput(TextInputProto {
            meta,
            default: Some(default.to_string()),
            max_chars,
            ..Default::default()
        }))?;
        Ok(value)
    }

    pub fn text_area(
        &mut self,
        label: &str,
        default: &str,
        max_chars: Option<usize>,
        key: Option<&str>,
    ) -> ScriptResult<String> {
        let meta = self.meta("text_area", label, key);
        let value = self.text_value(&meta.id, default, max_chars)?;
        self.emit(ElementProto::TextArea(TextAreaProto {
            meta,
            default: Some(default.to_string()),
            max_chars,
            ..Default::default()
        }))?;
        Ok(value)
    }

    /// `step` is in seconds
    pub fn time_input(
        &mut self,
        label: &str,
        default: NaiveTime,
        step: u32,
        key: Option<&str>,
    ) -> ScriptResult<NaiveTime> {
        let meta = self.meta("time_input", label, key);
        let value = self.register(&meta.id, json!(format_time(default)), false, |state| {
            match state {
                WidgetStateValue::StringValue(time) => parse_time(time).map(|t| json!(format_time(t))),
                _ => None,
            }
        })?;
        self.emit(ElementProto::TimeInput(TimeInputProto {
            meta,
            default: Some(format_time(default)),
            step,
        }))?;
        Ok(value.as_str().and_then(parse_time).unwrap_or(default))
    }

    // ════════════════════════════════════════════════════════════════════
    // Session and resources
    // ════════════════════════════════════════════════════════════════════

    /// User-set value, or the value of a widget declared earlier in this run
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.user.get(key).or_else(|| {
            self.widgets
                .iter()
                .find(|(id, _)| super::user_key_from_widget_id(id) == Some(key))
                .map(|(_, value)| value)
        })
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: Value) {
        self.user.insert(key.into(), value);
    }

    /// Value memoised in the engine's script cache, shared across runs
    pub fn cached(&self, key: &str, compute: impl FnOnce() -> Value) -> Value {
        self.resources.script_cache.get_or_insert_with(key, compute)
    }

    pub fn uploaded_files(&self, widget_id: &str) -> Vec<UploadedFile> {
        self.resources.uploaded_files.files(widget_id)
    }

    /// Sleep in small slices, aborting when the engine asks the run to stop
    pub fn sleep(&self, duration: Duration) -> ScriptResult<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.checkpoint()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

fn option_at(options: &[Value], idx: i64) -> Option<Value> {
    usize::try_from(idx).ok().and_then(|i| options.get(i).cloned())
}
