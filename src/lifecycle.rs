//! Widget hooks invoked by the tree walker.

use crate::context::ContextStack;
use crate::error::Result;
use crate::node::NodeRef;
use crate::paint::Painter;
use crate::request::Request;
use core::fmt;

/// How far a node got in the current request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Unvisited,
    Serviced,
    Prepared,
    Painted,
}

/// Widget behavior invoked by the tree walker.
///
/// A widget holds no session state of its own; anything that differs between sessions must be
/// stored on the node (see [`Node::set_property`](crate::Node::set_property)), which records it
/// in the active session.
///
/// Hooks are only invoked for nodes whose whole ancestry is visible.
pub trait Lifecycle: fmt::Debug + Send + Sync + 'static {
    /// Consumes inbound request data.
    fn service(&self, node: &NodeRef, cx: &ContextStack, request: &mut Request) -> Result<()> {
        let _ = (node, cx, request);
        Ok(())
    }

    /// Computes request-dependent display state.
    fn prepare(&self, node: &NodeRef, cx: &ContextStack) -> Result<()> {
        let _ = (node, cx);
        Ok(())
    }

    /// Paints this node, before its children.
    fn paint(&self, node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
        let _ = (node, cx, painter);
        Ok(())
    }

    /// Paints this node, after its children.
    fn paint_end(
        &self,
        node: &NodeRef,
        cx: &ContextStack,
        painter: &mut dyn Painter,
    ) -> Result<()> {
        let _ = (node, cx, painter);
        Ok(())
    }

    /// Whether the widget considers itself unchanged in the active session.
    ///
    /// Only consulted once the node itself carries no overrides.
    fn is_default_state(&self, node: &NodeRef, cx: &ContextStack) -> bool {
        let _ = (node, cx);
        true
    }

    /// Whether the walker enters this node.
    fn is_visible(&self, node: &NodeRef, cx: &ContextStack) -> bool {
        node.visible(cx)
    }
}
