//! Inbound requests.

use std::collections::BTreeMap;

/// Request parameters keyed by component id.
///
/// Widgets take the parameters addressed to them during the service pass; whatever is left
/// afterwards was not consumed by any visible widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    params: BTreeMap<String, String>,
}

impl Request {
    pub fn new() -> Request {
        Request::default()
    }

    /// Builder-style parameter insertion.
    pub fn with(mut self, id: impl Into<String>, value: impl Into<String>) -> Request {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.params.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.params.get(id).map(String::as_str)
    }

    /// Consumes a parameter.
    pub fn take(&mut self, id: &str) -> Option<String> {
        self.params.remove(id)
    }

    /// Returns the ids of parameters nothing has consumed.
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}
