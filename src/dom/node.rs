use super::style::InlineStyle;
use std::fmt;

/// Identity of a node, unique within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element node
///
/// Created detached via `Document::create_element`, then attached with
/// `Document::append_child`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: NodeId,
    tag: &'static str,
    text_content: String,
    style: InlineStyle,
}

impl Element {
    pub(super) fn new(id: NodeId, tag: &'static str) -> Self {
        Self {
            id,
            tag,
            text_content: String::new(),
            style: InlineStyle::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.text_content = text.into();
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: InlineStyle) {
        self.style = style;
    }
}
