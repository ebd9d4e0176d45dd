//! Container nodes, pre-order traversal and typed accessors

use std::collections::BTreeMap;
use std::ops::Index;

use super::{
    Button, Checkbox, Code, ColorPicker, Dataframe, DateInput, Element, ElementList, Exception,
    Heading, Json, Markdown, Multiselect, Node, NodeRef, NumberInput, Radio, SelectSlider,
    Selectbox, Slider, Text, TextArea, TextInput, TimeInput, UnknownElement, WidgetList,
};
use crate::error::{AppTestError, Result};
use crate::proto::BlockProto;

/// What kind of container a block is
#[derive(Debug, Clone, PartialEq)]
pub enum BlockTag {
    Root,
    Main,
    Sidebar,
    /// Auto-created for a path prefix that was never declared
    Placeholder,
    Declared(BlockProto),
}

/// Container with a sparse index -> child mapping.
///
/// Children are kept ordered by index, so iteration order is positional
/// regardless of message arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    tag: BlockTag,
    children: BTreeMap<usize, Node>,
}

impl Block {
    pub fn new(tag: BlockTag) -> Self {
        Self {
            tag,
            children: BTreeMap::new(),
        }
    }

    /// Root with its permanent `main` and `sidebar` slots
    pub(crate) fn root() -> Self {
        let mut root = Self::new(BlockTag::Root);
        root.children.insert(0, Node::Block(Self::new(BlockTag::Main)));
        root.children.insert(1, Node::Block(Self::new(BlockTag::Sidebar)));
        root
    }

    pub fn tag(&self) -> &BlockTag {
        &self.tag
    }

    /// `root`, `main`, `sidebar`, `""` for placeholders, else the wire tag
    pub fn type_tag(&self) -> &'static str {
        match &self.tag {
            BlockTag::Root => "root",
            BlockTag::Main => "main",
            BlockTag::Sidebar => "sidebar",
            BlockTag::Placeholder => "",
            BlockTag::Declared(proto) => proto.kind(),
        }
    }

    /// Source payload; `None` for synthetic blocks
    pub fn proto(&self) -> Option<&BlockProto> {
        match &self.tag {
            BlockTag::Declared(proto) => Some(proto),
            _ => None,
        }
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(&index)
    }

    /// Direct children in index order
    pub fn children(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.children.iter().map(|(idx, node)| (*idx, node))
    }

    /// Place `node` at `path` below this block.
    ///
    /// Missing intermediate blocks are created as placeholders; whatever
    /// occupied the final index is replaced.
    pub(crate) fn place(&mut self, path: &[usize], node: Node) -> Result<()> {
        let Some((&last, prefix)) = path.split_last() else {
            return Err(AppTestError::EmptyDeltaPath);
        };

        let mut current = self;
        for (depth, idx) in prefix.iter().enumerate() {
            let child = current
                .children
                .entry(*idx)
                .or_insert_with(|| Node::Block(Block::new(BlockTag::Placeholder)));
            current = match child {
                Node::Block(block) => block,
                Node::Element(el) => {
                    return Err(AppTestError::NotABlock {
                        path: path.to_vec(),
                        depth,
                        found: el.type_tag().to_string(),
                    })
                }
            };
        }
        current.children.insert(last, node);
        Ok(())
    }

    /// Pre-order traversal starting with this block itself
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![NodeRef::Block(self)],
        }
    }

    /// Every element of the subtree, in pre-order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.iter().filter_map(|node| node.as_element())
    }

    /// Nodes of the subtree whose type tag equals `type_tag`
    pub fn get(&self, type_tag: &str) -> Vec<NodeRef<'_>> {
        self.iter()
            .filter(|node| node.type_tag() == type_tag)
            .collect()
    }

    /// Blocks of the subtree whose type tag equals `type_tag`
    pub fn blocks(&self, type_tag: &str) -> ElementList<'_, Block> {
        self.iter()
            .filter_map(|node| node.as_block())
            .filter(|block| block.type_tag() == type_tag)
            .collect()
    }

    /// First widget of the subtree whose user key is `key`
    pub fn widget(&self, key: &str) -> Result<&Element> {
        self.elements()
            .find(|el| el.key() == Some(key))
            .ok_or_else(|| AppTestError::KeyNotFound {
                key: key.to_string(),
            })
    }
}

impl Index<usize> for Block {
    type Output = Node;

    /// Panics when no child sits at `index`; see [`Block::child`]
    fn index(&self, index: usize) -> &Node {
        &self.children[&index]
    }
}

impl<'a> IntoIterator for &'a Block {
    type Item = NodeRef<'a>;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> PreOrder<'a> {
        self.iter()
    }
}

/// Depth-first, parent before descendants before later siblings
pub struct PreOrder<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let node = self.stack.pop()?;
        if let NodeRef::Block(block) = node {
            self.stack
                .extend(block.children.values().rev().map(Node::as_ref));
        }
        Some(node)
    }
}

// ============================================================================
// TYPED ACCESSORS
// ============================================================================

macro_rules! element_accessors {
    ($list:ident: $($fn_name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Block {
            $(
                pub fn $fn_name(&self) -> $list<'_, $ty> {
                    self.elements()
                        .filter_map(|el| match el {
                            Element::$variant(inner) => Some(inner),
                            _ => None,
                        })
                        .collect()
                }
            )*
        }
    };
}

element_accessors! { ElementList:
    caption => Caption(Markdown),
    code => Code(Code),
    dataframe => Dataframe(Dataframe),
    divider => Divider(Markdown),
    exception => Exception(Exception),
    header => Header(Heading),
    json => Json(Json),
    latex => Latex(Markdown),
    markdown => Markdown(Markdown),
    subheader => Subheader(Heading),
    text => Text(Text),
    title => Title(Heading),
    unknown => Unknown(UnknownElement),
}

element_accessors! { WidgetList:
    button => Button(Button),
    checkbox => Checkbox(Checkbox),
    color_picker => ColorPicker(ColorPicker),
    date_input => DateInput(DateInput),
    multiselect => Multiselect(Multiselect),
    number_input => NumberInput(NumberInput),
    radio => Radio(Radio),
    select_slider => SelectSlider(SelectSlider),
    selectbox => Selectbox(Selectbox),
    slider => Slider(Slider),
    text_area => TextArea(TextArea),
    text_input => TextInput(TextInput),
    time_input => TimeInput(TimeInput),
}

macro_rules! block_accessors {
    ($($fn_name:ident => $tag:literal),* $(,)?) => {
        impl Block {
            $(
                pub fn $fn_name(&self) -> ElementList<'_, Block> {
                    self.blocks($tag)
                }
            )*
        }
    };
}

block_accessors! {
    columns => "column",
    expanders => "expandable",
    forms => "form",
    tabs => "tab",
}
