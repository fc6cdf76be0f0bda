//! Per-session overrides.

use crate::node::{Node, NodeRef};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Weak;

/// Session-scoped overrides for a single node.
///
/// A node without a model in a session is in its default state: every read falls through to
/// the shared defaults stored on the node.
#[derive(Debug, Default)]
pub struct ComponentModel {
    /// Visibility override.
    pub(crate) visible: Option<bool>,

    /// Replaces the shared child list inside this session.
    pub(crate) children: Option<Vec<NodeRef>>,

    /// Attribute overrides. `None` hides a shared attribute inside this session.
    pub(crate) attributes: BTreeMap<String, Option<Value>>,

    /// Flag overrides.
    pub(crate) flags: BTreeMap<String, bool>,

    /// Widget-specific properties.
    pub(crate) properties: BTreeMap<String, Value>,
}

impl ComponentModel {
    /// Returns true if this model carries no live overrides.
    pub fn is_empty(&self) -> bool {
        self.visible.is_none()
            && self.children.is_none()
            && self.attributes.is_empty()
            && self.flags.is_empty()
            && self.properties.is_empty()
    }

    /// Returns the dynamic child list, if this session diverges from the shared one.
    pub fn children(&self) -> Option<&[NodeRef]> {
        self.children.as_ref().map(|c| &c[..])
    }

    /// Returns the visibility override, if any.
    pub fn visible(&self) -> Option<bool> {
        self.visible
    }
}

/// Session-scoped placement of a node whose parent diverges from the shared structure.
#[derive(Debug, Clone)]
pub(crate) enum ParentLink {
    /// Attached to a parent inside this session only.
    Attached(Weak<Node>),
    /// Removed from its shared parent inside this session.
    Detached,
}
