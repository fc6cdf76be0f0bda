//! Component ids.
//!
//! A named node is identified by its name, prefixed with the id of its nearest enclosing naming
//! context. An unnamed node is identified by its position: the id of its nearest named (or
//! naming context) ancestor, followed by the framework separator and one positional code per
//! level down to the node. Positions are taken from the effective children in the active
//! session, so an unnamed node's id is only stable if every preceding sibling on the way down is
//! shared.
//!
//! Internal ids ignore names and naming contexts entirely: they are the decimal positions from
//! the top node, joined by the internal separator.

use crate::config::Config;
use crate::context::ContextStack;
use crate::error::{Error, Result};
use crate::node::{Node, NodeRef};
use std::collections::HashSet;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Appends the positional code of an index.
///
/// Indices below 36 take a single digit or lowercase letter. Larger indices take an uppercase
/// marker giving the digit count (`B` for two digits, `C` for three, ...) followed by the
/// base-36 digits, which keeps concatenated codes unambiguous.
pub fn encode_position(index: usize, out: &mut String) {
    if index < DIGITS.len() {
        out.push(DIGITS[index] as char);
        return;
    }
    let mut digits = Vec::new();
    let mut n = index;
    while n > 0 {
        digits.push(DIGITS[n % 36]);
        n /= 36;
    }
    out.push((b'A' + (digits.len() - 1) as u8) as char);
    for digit in digits.iter().rev() {
        out.push(*digit as char);
    }
}

/// Position of a node among its parent's effective children. Top nodes are at position 0.
///
/// A node whose effective parent does not list it has no position.
fn position(node: &Node, parent: Option<&Node>, cx: &ContextStack) -> Result<usize> {
    match parent {
        None => Ok(0),
        Some(parent) => parent.index_of(cx, node).ok_or_else(|| {
            Error::system(format!(
                "node {:?} is not among the children of its parent {:?}",
                node.node_id(),
                parent.node_id()
            ))
        }),
    }
}

/// Returns the nearest effective ancestor that is a naming context.
pub fn naming_scope(node: &Node, cx: &ContextStack) -> Option<NodeRef> {
    let mut ancestor = node.parent(cx);
    while let Some(node) = ancestor {
        if node.is_naming_context() {
            return Some(node);
        }
        ancestor = node.parent(cx);
    }
    None
}

fn component_id(node: &Node, cx: &ContextStack, config: &Config) -> Result<String> {
    if let Some(name) = node.name() {
        return match naming_scope(node, cx) {
            Some(scope) => {
                let mut id = component_id(&scope, cx, config)?;
                id.push_str(&config.context_separator);
                id.push_str(&name);
                Ok(id)
            }
            None => Ok(name),
        };
    }

    let mut positions = Vec::new();
    let mut anchor = None;
    let mut parent = node.parent(cx);
    positions.push(position(node, parent.as_deref(), cx)?);
    while let Some(p) = parent {
        if p.name().is_some() || p.is_naming_context() {
            anchor = Some(p);
            break;
        }
        let grandparent = p.parent(cx);
        positions.push(position(&p, grandparent.as_deref(), cx)?);
        parent = grandparent;
    }

    let mut id = match anchor {
        Some(anchor) => {
            let mut id = component_id(&anchor, cx, config)?;
            id.push_str(&config.context_separator);
            id
        }
        None => String::new(),
    };
    id.push_str(&config.framework_separator);
    for index in positions.iter().rev() {
        encode_position(*index, &mut id);
    }
    Ok(id)
}

impl Node {
    /// Returns this node's component id in the active session.
    ///
    /// Fails with a system error if the effective structure is inconsistent.
    pub fn component_id(&self, cx: &ContextStack) -> Result<String> {
        component_id(self, cx, cx.config())
    }

    /// Returns this node's internal id in the active session.
    pub fn internal_id(&self, cx: &ContextStack) -> Result<String> {
        let mut positions = Vec::new();
        let mut parent = self.parent(cx);
        positions.push(position(self, parent.as_deref(), cx)?);
        while let Some(p) = parent {
            let grandparent = p.parent(cx);
            positions.push(position(&p, grandparent.as_deref(), cx)?);
            parent = grandparent;
        }
        Ok(positions
            .iter()
            .rev()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(cx.config().internal_separator.as_str()))
    }
}

/// Collects the ids of named nodes met during one tree walk and rejects duplicates.
#[derive(Debug, Default)]
pub struct NameRegistry {
    seen: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> NameRegistry {
        NameRegistry::default()
    }

    /// Records a node. Unnamed nodes are ignored.
    pub fn register(&mut self, node: &Node, cx: &ContextStack, config: &Config) -> Result<()> {
        if node.name().is_none() {
            return Ok(());
        }
        let id = component_id(node, cx, config)?;
        if self.seen.insert(id.clone()) {
            Ok(())
        } else {
            Err(Error::system(format!(
                "duplicate component id {:?} within one naming scope",
                id
            )))
        }
    }
}
