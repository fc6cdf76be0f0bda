//! Paint output.

use crate::value::Value;

/// Receives the output of the paint pass.
///
/// The output format is up to the implementor; the walker only guarantees that calls for a
/// node's children come between that node's `paint` and `paint_end` hooks.
pub trait Painter {
    /// Opens an element for a component.
    fn open(&mut self, id: &str, tag: &str);

    /// Adds an attribute to the element that was opened last.
    fn attribute(&mut self, key: &str, value: &Value);

    fn text(&mut self, text: &str);

    fn close(&mut self, tag: &str);
}

/// A recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// `(id, tag)`
    Open(String, String),
    /// `(key, value)`
    Attribute(String, Value),
    Text(String),
    Close(String),
}

/// A painter that records every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    ops: Vec<PaintOp>,
}

impl Transcript {
    pub fn new() -> Transcript {
        Transcript::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Returns the ids of all opened elements, in order.
    pub fn opened_ids(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Open(id, _) => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns all painted text, concatenated.
    pub fn painted_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Painter for Transcript {
    fn open(&mut self, id: &str, tag: &str) {
        self.ops.push(PaintOp::Open(id.to_string(), tag.to_string()));
    }

    fn attribute(&mut self, key: &str, value: &Value) {
        self.ops
            .push(PaintOp::Attribute(key.to_string(), value.clone()));
    }

    fn text(&mut self, text: &str) {
        self.ops.push(PaintOp::Text(text.to_string()));
    }

    fn close(&mut self, tag: &str) {
        self.ops.push(PaintOp::Close(tag.to_string()));
    }
}
