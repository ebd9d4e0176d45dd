//! Builds an [`AppTree`] from the ordered message stream of one run

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use super::{
    AppTree, Block, BlockTag, Button, Checkbox, Code, ColorPicker, Dataframe, DateInput, Element,
    Exception, Heading, Json, Markdown, Multiselect, Node, NumberInput, Radio, SelectSlider,
    Selectbox, Slider, Text, TextArea, TextInput, TimeInput, UnknownElement,
};
use crate::error::{AppTestError, Result};
use crate::proto::{
    Delta, ElementProto, ForwardMsg, HeadingTag, MarkdownType, NewElement, RawElement,
    SliderType,
};
use crate::session::SessionSnapshot;

/// Apply every delta of `messages`, in order, onto a fresh root.
///
/// Non-delta messages and `add_rows` deltas are skipped. A later delta at
/// an occupied path replaces the earlier node.
#[instrument(skip_all, fields(messages = messages.len()))]
pub fn parse_tree_from_messages(
    messages: &[ForwardMsg],
    session: Arc<SessionSnapshot>,
) -> Result<AppTree> {
    let mut root = Block::root();
    let mut applied = 0usize;

    for msg in messages {
        let Some(delta) = msg.delta() else {
            trace!("skipping non-delta message");
            continue;
        };
        let node = match delta {
            Delta::NewElement(element) => Node::Element(build_element(element, &session)?),
            Delta::AddBlock(proto) => Node::Block(Block::new(BlockTag::Declared(proto.clone()))),
            Delta::AddRows(_) => {
                trace!(path = ?msg.delta_path(), "skipping add_rows delta");
                continue;
            }
        };
        root.place(msg.delta_path(), node)?;
        applied += 1;
    }

    debug!(applied, "element tree built");
    Ok(AppTree::new(root, session))
}

fn build_element(element: &NewElement, session: &Arc<SessionSnapshot>) -> Result<Element> {
    let proto = match element {
        NewElement::Known(proto) => proto,
        NewElement::Unrecognized(raw) if ElementProto::is_known_kind(&raw.kind) => {
            return Err(malformed(raw));
        }
        NewElement::Unrecognized(raw) => {
            debug!(kind = %raw.kind, "unrecognized element kind");
            return Ok(Element::Unknown(UnknownElement {
                kind: raw.kind.clone(),
                payload: raw.payload.clone(),
            }));
        }
    };

    let session = Arc::clone(session);
    let el = match proto {
        ElementProto::ArrowDataFrame(p) => Element::Dataframe(Dataframe {
            data: p.data.clone(),
        }),
        ElementProto::Button(p) => Element::Button(Button::new(p.clone(), session)),
        ElementProto::Checkbox(p) => Element::Checkbox(Checkbox::new(p.clone(), session)),
        ElementProto::Code(p) => Element::Code(Code { proto: p.clone() }),
        ElementProto::ColorPicker(p) => Element::ColorPicker(ColorPicker::new(p.clone(), session)),
        ElementProto::DateInput(p) => Element::DateInput(DateInput::new(p.clone(), session)),
        ElementProto::Exception(p) => Element::Exception(Exception { proto: p.clone() }),
        ElementProto::Heading(p) => {
            let kind = HeadingTag::from_wire(&p.tag)
                .ok_or_else(|| unknown_subtype("heading", &p.tag))?;
            let heading = Heading {
                kind,
                proto: p.clone(),
            };
            match kind {
                HeadingTag::Title => Element::Title(heading),
                HeadingTag::Header => Element::Header(heading),
                HeadingTag::Subheader => Element::Subheader(heading),
            }
        }
        ElementProto::Json(p) => Element::Json(Json { proto: p.clone() }),
        ElementProto::Markdown(p) => {
            let kind = MarkdownType::from_wire(p.element_type)
                .ok_or_else(|| unknown_subtype("markdown", p.element_type))?;
            let markdown = Markdown {
                kind,
                proto: p.clone(),
            };
            match kind {
                MarkdownType::Native => Element::Markdown(markdown),
                MarkdownType::Caption => Element::Caption(markdown),
                MarkdownType::Latex => Element::Latex(markdown),
                MarkdownType::Divider => Element::Divider(markdown),
            }
        }
        ElementProto::Multiselect(p) => Element::Multiselect(Multiselect::new(p.clone(), session)),
        ElementProto::NumberInput(p) => Element::NumberInput(NumberInput::new(p.clone(), session)),
        ElementProto::Radio(p) => Element::Radio(Radio::new(p.clone(), session)),
        ElementProto::Selectbox(p) => Element::Selectbox(Selectbox::new(p.clone(), session)),
        ElementProto::Slider(p) => match SliderType::from_wire(p.slider_type) {
            Some(SliderType::Slider) => Element::Slider(Slider::new(p.clone(), session)),
            Some(SliderType::SelectSlider) => {
                Element::SelectSlider(SelectSlider::new(p.clone(), session))
            }
            None => return Err(unknown_subtype("slider", p.slider_type)),
        },
        ElementProto::Text(p) => Element::Text(Text { proto: p.clone() }),
        ElementProto::TextArea(p) => Element::TextArea(TextArea::new(p.clone(), session)),
        ElementProto::TextInput(p) => Element::TextInput(TextInput::new(p.clone(), session)),
        ElementProto::TimeInput(p) => Element::TimeInput(TimeInput::new(p.clone(), session)),
    };
    Ok(el)
}

/// Decode error of a known kind, recovered by decoding the raw payload again
fn malformed(raw: &RawElement) -> AppTestError {
    let details = serde_json::to_value(raw)
        .and_then(serde_json::from_value::<ElementProto>)
        .err()
        .map_or_else(|| "payload did not decode".to_string(), |e| e.to_string());
    warn!(kind = %raw.kind, %details, "malformed element payload");
    AppTestError::MalformedElement {
        kind: raw.kind.clone(),
        details,
    }
}

fn unknown_subtype(element: &str, subtype: impl ToString) -> AppTestError {
    AppTestError::UnknownSubtype {
        element: element.to_string(),
        subtype: subtype.to_string(),
    }
}
