//! Grouping element.

use crate::context::ContextStack;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::node::{Node, NodeRef};
use crate::paint::Painter;

/// A plain grouping element.
#[derive(Debug)]
pub struct Container {
    tag: &'static str,
}

impl Container {
    pub fn new() -> NodeRef {
        Container::with_tag("div")
    }

    pub fn with_tag(tag: &'static str) -> NodeRef {
        Node::new(Container { tag })
    }
}

impl Lifecycle for Container {
    fn paint(&self, node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.open(&node.component_id(cx)?, self.tag);
        if let Some(class) = node.attribute(cx, "class") {
            painter.attribute("class", &class);
        }
        Ok(())
    }

    fn paint_end(&self, _: &NodeRef, _: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.close(self.tag);
        Ok(())
    }
}
