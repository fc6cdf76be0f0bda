//! Single-line text input.

use crate::context::ContextStack;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::node::{Node, NodeRef};
use crate::paint::Painter;
use crate::request::Request;
use crate::value::Value;
use core::fmt;
use std::sync::Arc;

const VALUE: &str = "value";

/// Called after the service pass for every text field whose value changed.
pub type ChangeListener = Arc<dyn Fn(&NodeRef, &ContextStack, &Value) -> Result<()> + Send + Sync>;

/// A single-line text input.
///
/// Takes the request parameter addressed to its component id as its new value.
pub struct TextField {
    on_change: Option<ChangeListener>,
}

impl TextField {
    pub fn new() -> NodeRef {
        Node::new(TextField { on_change: None })
    }

    pub fn with_listener(listener: ChangeListener) -> NodeRef {
        Node::new(TextField {
            on_change: Some(listener),
        })
    }

    pub fn value(node: &Node, cx: &ContextStack) -> Option<Value> {
        node.property(cx, VALUE)
    }

    pub fn set_value(node: &Node, cx: &ContextStack, value: impl Into<Value>) {
        node.set_property(cx, VALUE, value);
    }
}

impl fmt::Debug for TextField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TextField")
            .field("on_change", &self.on_change.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Lifecycle for TextField {
    fn service(&self, node: &NodeRef, cx: &ContextStack, request: &mut Request) -> Result<()> {
        let input = match request.take(&node.component_id(cx)?) {
            Some(input) => Value::Text(input),
            None => return Ok(()),
        };
        if TextField::value(node, cx).as_ref() == Some(&input) {
            return Ok(());
        }
        TextField::set_value(node, cx, input.clone());

        if let (Some(listener), Some(session)) = (&self.on_change, cx.active()) {
            let listener = Arc::clone(listener);
            let node = Arc::clone(node);
            session.invoke_later(move |cx| listener(&node, cx, &input));
        }
        Ok(())
    }

    fn prepare(&self, node: &NodeRef, cx: &ContextStack) -> Result<()> {
        if let Some(session) = cx.active() {
            session.lock().offer_focus(Arc::clone(node));
        }
        Ok(())
    }

    fn paint(&self, node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.open(&node.component_id(cx)?, "input");
        if let Some(value) = TextField::value(node, cx) {
            painter.attribute(VALUE, &value);
        }
        Ok(())
    }

    fn paint_end(&self, _: &NodeRef, _: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        painter.close("input");
        Ok(())
    }
}
