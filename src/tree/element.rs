//! Plain (non-widget) element nodes
//!
//! Each kind exposes a fixed accessor set over its payload. Payload fields
//! without an accessor are not reachable from the tree.

use serde_json::{Map, Value};

use super::ResolveValue;
use crate::error::Result;
use crate::proto::{
    CodeProto, ExceptionProto, HeadingProto, HeadingTag, JsonProto, MarkdownProto, MarkdownType,
    TableData, TextProto,
};

macro_rules! impl_resolve_str {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ResolveValue for $ty {
                type Output = String;

                fn resolve(&self) -> Result<String> {
                    Ok(self.value().to_string())
                }

                fn resolve_json(&self) -> Result<Value> {
                    Ok(Value::String(self.value().to_string()))
                }
            }
        )*
    };
}

impl_resolve_str!(Text, Code, Heading, Markdown, Exception, Json);

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) proto: TextProto,
}

impl Text {
    pub fn value(&self) -> &str {
        &self.proto.body
    }

    pub fn help(&self) -> &str {
        &self.proto.help
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub(crate) proto: CodeProto,
}

impl Code {
    pub fn value(&self) -> &str {
        &self.proto.code_text
    }

    /// `None` when no language was declared
    pub fn language(&self) -> Option<&str> {
        Some(self.proto.language.as_str()).filter(|l| !l.is_empty())
    }

    pub fn show_line_numbers(&self) -> bool {
        self.proto.show_line_numbers
    }
}

/// Title, header or subheader
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub(crate) kind: HeadingTag,
    pub(crate) proto: HeadingProto,
}

impl Heading {
    pub fn value(&self) -> &str {
        &self.proto.body
    }

    pub fn kind(&self) -> HeadingTag {
        self.kind
    }

    pub fn anchor(&self) -> Option<&str> {
        self.proto.anchor.as_deref()
    }

    pub fn hide_anchor(&self) -> bool {
        self.proto.hide_anchor
    }

    pub fn help(&self) -> &str {
        &self.proto.help
    }
}

/// Markdown, caption, latex or divider
#[derive(Debug, Clone, PartialEq)]
pub struct Markdown {
    pub(crate) kind: MarkdownType,
    pub(crate) proto: MarkdownProto,
}

impl Markdown {
    pub fn value(&self) -> &str {
        &self.proto.body
    }

    pub fn kind(&self) -> MarkdownType {
        self.kind
    }

    pub fn allow_html(&self) -> bool {
        self.proto.allow_html
    }

    pub fn is_caption(&self) -> bool {
        self.proto.is_caption
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub(crate) proto: ExceptionProto,
}

impl Exception {
    /// The exception message
    pub fn value(&self) -> &str {
        &self.proto.message
    }

    pub fn message(&self) -> &str {
        &self.proto.message
    }

    pub fn type_name(&self) -> &str {
        &self.proto.type_name
    }

    pub fn stack_trace(&self) -> &[String] {
        &self.proto.stack_trace
    }

    pub fn is_warning(&self) -> bool {
        self.proto.is_warning
    }

    pub fn is_markdown(&self) -> bool {
        self.proto.message_is_markdown
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Json {
    pub(crate) proto: JsonProto,
}

impl Json {
    /// Serialized JSON body as sent
    pub fn value(&self) -> &str {
        &self.proto.body
    }

    /// Parsed body, `None` when the body is not valid JSON
    pub fn parsed(&self) -> Option<Value> {
        serde_json::from_str(&self.proto.body).ok()
    }

    pub fn expanded(&self) -> bool {
        self.proto.expanded
    }
}

/// Table element; rows are replaced wholesale each run
#[derive(Debug, Clone, PartialEq)]
pub struct Dataframe {
    pub(crate) data: TableData,
}

impl Dataframe {
    pub fn value(&self) -> &TableData {
        &self.data
    }

    pub fn columns(&self) -> &[String] {
        &self.data.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.data.rows
    }

    /// Cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.data.columns.iter().position(|c| c == column)?;
        self.data.rows.get(row)?.get(col)
    }
}

impl ResolveValue for Dataframe {
    type Output = TableData;

    fn resolve(&self) -> Result<TableData> {
        Ok(self.data.clone())
    }

    fn resolve_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.data)?)
    }
}

/// Element whose wire tag this crate does not model.
///
/// Only the tag and the raw payload are exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownElement {
    pub(crate) kind: String,
    pub(crate) payload: Map<String, Value>,
}

impl UnknownElement {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl ResolveValue for UnknownElement {
    type Output = Map<String, Value>;

    fn resolve(&self) -> Result<Self::Output> {
        Ok(self.payload.clone())
    }

    fn resolve_json(&self) -> Result<Value> {
        Ok(Value::Object(self.payload.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_language_absent_when_empty() {
        let code = Code {
            proto: CodeProto {
                code_text: "x = 1".into(),
                ..Default::default()
            },
        };
        assert_eq!(code.language(), None);
        assert_eq!(code.resolve().unwrap(), "x = 1");
    }

    #[test]
    fn test_json_parsed_body() {
        let el = Json {
            proto: JsonProto {
                body: r#"{"a": [1, 2]}"#.into(),
                expanded: true,
            },
        };
        assert_eq!(el.parsed(), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_dataframe_cell_lookup() {
        let df = Dataframe {
            data: TableData {
                columns: vec!["name".into(), "n".into()],
                rows: vec![vec![json!("a"), json!(1)], vec![json!("b"), json!(2)]],
            },
        };
        assert_eq!(df.cell(1, "n"), Some(&json!(2)));
        assert_eq!(df.cell(2, "n"), None);
        assert_eq!(df.cell(0, "missing"), None);
    }
}
