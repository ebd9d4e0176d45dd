//! Widget value -> wire record encoding
//!
//! Each widget kind maps its resolved value to exactly one
//! [`WidgetStateValue`] shape:
//!
//! | Kind                      | Wire shape                         |
//! |---------------------------|------------------------------------|
//! | button                    | `trigger_value`                    |
//! | checkbox                  | `bool_value`                       |
//! | color picker, text        | `string_value`                     |
//! | time input                | `string_value` (`HH:MM`)           |
//! | number input              | `double_value`                     |
//! | radio, selectbox          | `int_value` (option index)         |
//! | multiselect               | `int_array_value` (option indices) |
//! | date input                | `string_array_value` (ISO dates)   |
//! | slider                    | `double_array_value`               |
//! | select slider             | `double_array_value` (indices)     |
//!
//! Widgets with neither an overlay nor a session value report nothing.

use serde_json::Value;

use crate::error::{AppTestError, Result};
use crate::proto::{WidgetState, WidgetStateValue};
use crate::tree::{
    Button, Checkbox, ColorPicker, DateInput, Multiselect, NumberInput, Overlay, Radio,
    SelectSlider, Selectbox, Slider, TextArea, TextInput, TimeInput, Widget,
};
use crate::value::{format_date, format_time, option_index, RangeValue};

/// Encodes a widget's current value as its wire record
pub trait WidgetStateCodec {
    /// `None` when the widget has nothing to report
    fn widget_state(&self) -> Result<Option<WidgetState>>;
}

fn record(id: &str, value: WidgetStateValue) -> Result<Option<WidgetState>> {
    Ok(Some(WidgetState::new(id, value)))
}

fn index_of(widget_id: &str, options: &[String], value: &Value) -> Result<usize> {
    option_index(options, value).ok_or_else(|| AppTestError::OptionNotFound {
        widget_id: widget_id.to_string(),
        value: value.to_string(),
    })
}

fn check_arity(widget_id: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(AppTestError::RangeArity {
            widget_id: widget_id.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

impl WidgetStateCodec for Button {
    /// Buttons always report; untouched buttons report `false`
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        let clicked = match self.core.overlay() {
            Overlay::Triggered => true,
            Overlay::Value(value) => value,
            Overlay::NotSet => false,
        };
        record(self.id(), WidgetStateValue::TriggerValue(clicked))
    }
}

impl WidgetStateCodec for Checkbox {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        record(self.id(), WidgetStateValue::BoolValue(self.value()?))
    }
}

impl WidgetStateCodec for ColorPicker {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        record(self.id(), WidgetStateValue::StringValue(self.value()?))
    }
}

impl WidgetStateCodec for TextInput {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        record(self.id(), WidgetStateValue::StringValue(self.value()?))
    }
}

impl WidgetStateCodec for TextArea {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        record(self.id(), WidgetStateValue::StringValue(self.value()?))
    }
}

impl WidgetStateCodec for NumberInput {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        match self.value()? {
            Some(n) => record(self.id(), WidgetStateValue::DoubleValue(n)),
            None => Ok(None),
        }
    }
}

impl WidgetStateCodec for DateInput {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        let dates = self.value()?.dates().into_iter().map(format_date).collect();
        record(self.id(), WidgetStateValue::StringArrayValue(dates))
    }
}

impl WidgetStateCodec for TimeInput {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        record(self.id(), WidgetStateValue::StringValue(format_time(self.value()?)))
    }
}

impl WidgetStateCodec for Radio {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        match self.value()? {
            Some(value) => {
                let idx = index_of(self.id(), self.options(), &value)?;
                record(self.id(), WidgetStateValue::IntValue(idx as i64))
            }
            None => Ok(None),
        }
    }
}

impl WidgetStateCodec for Selectbox {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        match self.value()? {
            Some(value) => {
                let idx = index_of(self.id(), self.options(), &value)?;
                record(self.id(), WidgetStateValue::IntValue(idx as i64))
            }
            None => Ok(None),
        }
    }
}

impl WidgetStateCodec for Multiselect {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        let indices = self
            .value()?
            .iter()
            .map(|value| index_of(self.id(), self.options(), value).map(|idx| idx as i64))
            .collect::<Result<Vec<_>>>()?;
        record(self.id(), WidgetStateValue::IntArrayValue(indices))
    }
}

impl WidgetStateCodec for Slider {
    /// The value must match the declared arity (one handle or two)
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        let value = self.value()?;
        check_arity(self.id(), self.proto.default.len(), value.arity())?;
        let values = value.as_slice_vec().into_iter().copied().collect();
        record(self.id(), WidgetStateValue::DoubleArrayValue(values))
    }
}

impl WidgetStateCodec for SelectSlider {
    fn widget_state(&self) -> Result<Option<WidgetState>> {
        if !self.core.reportable(self.id()) {
            return Ok(None);
        }
        let value: RangeValue<Value> = self.value()?;
        check_arity(self.id(), self.proto.default.len(), value.arity())?;
        let indices = value
            .as_slice_vec()
            .into_iter()
            .map(|v| index_of(self.id(), self.options(), v).map(|idx| idx as f64))
            .collect::<Result<Vec<_>>>()?;
        record(self.id(), WidgetStateValue::DoubleArrayValue(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    use crate::proto::{
        ButtonProto, CheckboxProto, DateInputProto, MultiSelectProto, NumberInputProto, RadioProto,
        SliderProto, TimeInputProto, WidgetMeta,
    };
    use crate::session::SessionSnapshot;
    use crate::value::DateValue;

    fn session(id: &str, value: Value) -> Arc<SessionSnapshot> {
        Arc::new(SessionSnapshot::new().with_widget(id, value))
    }

    fn state_value(state: Option<WidgetState>) -> WidgetStateValue {
        state.map(|s| s.value).expect("widget should report a state")
    }

    #[test]
    fn test_untouched_button_reports_false_trigger() {
        let button = Button::new(
            ButtonProto {
                meta: WidgetMeta::new("b", "go"),
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new()),
        );
        assert_eq!(
            state_value(button.widget_state().unwrap()),
            WidgetStateValue::TriggerValue(false)
        );
        button.click();
        assert_eq!(
            state_value(button.widget_state().unwrap()),
            WidgetStateValue::TriggerValue(true)
        );
    }

    #[test]
    fn test_widget_without_value_reports_nothing() {
        let checkbox = Checkbox::new(
            CheckboxProto {
                meta: WidgetMeta::new("c", "check"),
                default: false,
            },
            Arc::new(SessionSnapshot::new()),
        );
        assert!(checkbox.widget_state().unwrap().is_none());
        checkbox.check();
        assert_eq!(
            state_value(checkbox.widget_state().unwrap()),
            WidgetStateValue::BoolValue(true)
        );
    }

    #[test]
    fn test_radio_encodes_option_index() {
        let radio = Radio::new(
            RadioProto {
                meta: WidgetMeta::new("r", "pick"),
                options: vec!["1".into(), "2".into(), "3".into()],
                ..Default::default()
            },
            session("r", json!(1)),
        );
        assert_eq!(
            state_value(radio.widget_state().unwrap()),
            WidgetStateValue::IntValue(0)
        );
        radio.set_value(3);
        assert_eq!(
            state_value(radio.widget_state().unwrap()),
            WidgetStateValue::IntValue(2)
        );
        radio.set_value("nope");
        assert!(matches!(
            radio.widget_state(),
            Err(AppTestError::OptionNotFound { .. })
        ));
    }

    #[test]
    fn test_multiselect_encodes_indices() {
        let multi = Multiselect::new(
            MultiSelectProto {
                meta: WidgetMeta::new("m", "pick"),
                options: vec!["a".into(), "b".into(), "c".into()],
                ..Default::default()
            },
            session("m", json!(["c", "a"])),
        );
        assert_eq!(
            state_value(multi.widget_state().unwrap()),
            WidgetStateValue::IntArrayValue(vec![2, 0])
        );
    }

    #[test]
    fn test_slider_arity_mismatch_fails() {
        let slider = Slider::new(
            SliderProto {
                meta: WidgetMeta::new("s", "range"),
                default: vec![1.0, 5.0],
                slider_type: 1,
                ..Default::default()
            },
            session("s", json!([1.0, 5.0])),
        );
        assert_eq!(
            state_value(slider.widget_state().unwrap()),
            WidgetStateValue::DoubleArrayValue(vec![1.0, 5.0])
        );
        slider.set_value(RangeValue::Single(3.0));
        assert!(matches!(
            slider.widget_state(),
            Err(AppTestError::RangeArity {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_select_slider_encodes_option_positions() {
        let slider = SelectSlider::new(
            SliderProto {
                meta: WidgetMeta::new("ss", "size"),
                default: vec![0.0],
                options: vec!["S".into(), "M".into(), "L".into()],
                slider_type: 2,
                ..Default::default()
            },
            session("ss", json!("M")),
        );
        assert_eq!(
            state_value(slider.widget_state().unwrap()),
            WidgetStateValue::DoubleArrayValue(vec![1.0])
        );
    }

    #[test]
    fn test_number_input_empty_reports_nothing() {
        let number = NumberInput::new(
            NumberInputProto {
                meta: WidgetMeta::new("n", "n"),
                ..Default::default()
            },
            session("n", Value::Null),
        );
        assert!(number.widget_state().unwrap().is_none());
        number.set_value(Some(2.5));
        assert_eq!(
            state_value(number.widget_state().unwrap()),
            WidgetStateValue::DoubleValue(2.5)
        );
    }

    #[test]
    fn test_date_and_time_use_text_formats() {
        let date = DateInput::new(
            DateInputProto {
                meta: WidgetMeta::new("d", "when"),
                ..Default::default()
            },
            Arc::new(SessionSnapshot::new()),
        );
        date.set_value(DateValue::Range(vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        ]));
        assert_eq!(
            state_value(date.widget_state().unwrap()),
            WidgetStateValue::StringArrayValue(vec!["2024-01-02".into(), "2024-01-09".into()])
        );

        let time = TimeInput::new(
            TimeInputProto {
                meta: WidgetMeta::new("t", "at"),
                default: None,
                step: 60,
            },
            Arc::new(SessionSnapshot::new()),
        );
        time.set_value(NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert_eq!(
            state_value(time.widget_state().unwrap()),
            WidgetStateValue::StringValue("07:05".into())
        );
    }
}
