//! Static text.

use crate::context::ContextStack;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::node::{Node, NodeRef};
use crate::paint::Painter;
use crate::value::Value;

const TEXT: &str = "text";

/// Static text.
#[derive(Debug)]
pub struct Label;

impl Label {
    /// Creates a label with shared default text.
    pub fn new(text: &str) -> NodeRef {
        let node = Node::new(Label);
        node.set_property(&ContextStack::new(), TEXT, text);
        node
    }

    pub fn text(node: &Node, cx: &ContextStack) -> Result<String> {
        node.property(cx, TEXT)
            .unwrap_or_else(|| Value::from(""))
            .to_text()
    }

    pub fn set_text(node: &Node, cx: &ContextStack, text: &str) {
        node.set_property(cx, TEXT, text);
    }
}

impl Lifecycle for Label {
    fn paint(&self, node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.open(&node.component_id(cx)?, "span");
        painter.text(&Label::text(node, cx)?);
        Ok(())
    }

    fn paint_end(&self, _: &NodeRef, _: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.close("span");
        Ok(())
    }
}
