//! Component nodes.

use crate::context::ContextStack;
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use crate::model::{ComponentModel, ParentLink};
use crate::session::Session;
use crate::value::Value;
use core::fmt;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// A unique identifier for a node.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32, u16, u16, [u8; 8]);

impl NodeId {
    pub(crate) fn new() -> NodeId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        NodeId(a, b, c, *d)
    }
}

pub type NodeRef = Arc<Node>;

/// Shared structure. Frozen once the node is locked.
struct Structure {
    name: Option<String>,
    naming_context: bool,
    parent: Weak<Node>,
    children: Vec<NodeRef>,
}

/// Shared default state, used wherever a session has no override.
#[derive(Debug)]
struct Defaults {
    visible: bool,
    attributes: BTreeMap<String, Value>,
    flags: BTreeSet<String>,
    properties: BTreeMap<String, Value>,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            visible: true,
            attributes: BTreeMap::new(),
            flags: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }
}

/// A component in the shared tree.
///
/// Nodes are assembled once and then locked. Until then, structural edits change the shared
/// structure directly. Afterwards, the shared structure is read-only and every edit is recorded
/// in the active session's component models instead, so each session sees its own effective
/// tree while all of them share the same nodes.
pub struct Node {
    id: NodeId,
    locked: AtomicBool,
    structure: RwLock<Structure>,
    defaults: RwLock<Defaults>,
    widget: Box<dyn Lifecycle>,
}

impl Node {
    /// Creates a new unlocked node driven by the given widget.
    pub fn new<W: Lifecycle>(widget: W) -> NodeRef {
        Arc::new(Node {
            id: NodeId::new(),
            locked: AtomicBool::new(false),
            structure: RwLock::new(Structure {
                name: None,
                naming_context: false,
                parent: Weak::new(),
                children: Vec::new(),
            }),
            defaults: RwLock::new(Defaults::default()),
            widget: Box::new(widget),
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn widget(&self) -> &dyn Lifecycle {
        &*self.widget
    }

    /// Returns true once the node has been placed into service.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Locks this node and its whole shared subtree.
    pub fn lock(&self) {
        if !self.locked.swap(true, Ordering::AcqRel) {
            debug!(node = ?self.id, "locked node");
        }
        for child in self.structure.read().children.iter() {
            child.lock();
        }
    }

    /// Returns the explicit name.
    pub fn name(&self) -> Option<String> {
        self.structure.read().name.clone()
    }

    /// Sets or clears the explicit name.
    ///
    /// Names must start with an ASCII letter and may only contain ASCII letters, digits and
    /// underscores.
    pub fn set_name(&self, name: Option<&str>) -> Result<()> {
        if let Some(name) = name {
            validate_name(name)?;
        }
        self.check_unlocked("rename")?;
        self.structure.write().name = name.map(str::to_string);
        Ok(())
    }

    /// Returns true if descendant ids are scoped to this node.
    pub fn is_naming_context(&self) -> bool {
        self.structure.read().naming_context
    }

    pub fn set_naming_context(&self, naming_context: bool) -> Result<()> {
        self.check_unlocked("change the naming scope of")?;
        self.structure.write().naming_context = naming_context;
        Ok(())
    }

    fn check_unlocked(&self, action: &str) -> Result<()> {
        if self.is_locked() {
            Err(Error::state(format!(
                "cannot {} a locked node {:?}",
                action, self.id
            )))
        } else {
            Ok(())
        }
    }

    // structure

    /// Returns the effective children in the active session.
    pub fn children(&self, cx: &ContextStack) -> Vec<NodeRef> {
        if let Some(session) = cx.active() {
            let ctx = session.lock();
            if let Some(children) = ctx.model(self.id).and_then(ComponentModel::children) {
                return children.to_vec();
            }
        }
        self.structure.read().children.clone()
    }

    /// Returns the shared children, ignoring every session.
    pub fn static_children(&self) -> Vec<NodeRef> {
        self.structure.read().children.clone()
    }

    pub fn child_count(&self, cx: &ContextStack) -> usize {
        self.children(cx).len()
    }

    pub fn child(&self, cx: &ContextStack, index: usize) -> Option<NodeRef> {
        self.children(cx).get(index).cloned()
    }

    /// Returns the position of a node among the effective children.
    pub fn index_of(&self, cx: &ContextStack, child: &Node) -> Option<usize> {
        self.children(cx).iter().position(|c| c.id == child.id)
    }

    /// Returns the effective parent in the active session.
    pub fn parent(&self, cx: &ContextStack) -> Option<NodeRef> {
        if let Some(session) = cx.active() {
            let ctx = session.lock();
            match ctx.parents.get(&self.id) {
                Some(ParentLink::Attached(parent)) => return parent.upgrade(),
                Some(ParentLink::Detached) => return None,
                None => (),
            }
        }
        self.structure.read().parent.upgrade()
    }

    /// Returns the topmost effective ancestor, or `None` if this node has no parent.
    pub fn top(&self, cx: &ContextStack) -> Option<NodeRef> {
        let mut top = self.parent(cx)?;
        while let Some(parent) = top.parent(cx) {
            top = parent;
        }
        Some(top)
    }

    /// Appends a child.
    pub fn add(self: &Arc<Self>, cx: &ContextStack, child: &NodeRef) -> Result<()> {
        self.insert_at(cx, None, child)
    }

    /// Inserts a child at the given position among the effective children.
    pub fn insert(self: &Arc<Self>, cx: &ContextStack, index: usize, child: &NodeRef) -> Result<()> {
        self.insert_at(cx, Some(index), child)
    }

    fn insert_at(
        self: &Arc<Self>,
        cx: &ContextStack,
        index: Option<usize>,
        child: &NodeRef,
    ) -> Result<()> {
        let session = self.structural_session(cx, child)?;

        if let Some(parent) = child.parent(cx) {
            return Err(Error::structure(format!(
                "node {:?} already has a parent {:?}",
                child.id, parent.id
            )));
        }
        let mut ancestor = Some(Arc::clone(self));
        while let Some(node) = ancestor {
            if node.id == child.id {
                return Err(Error::structure(format!(
                    "adding {:?} to {:?} would create a cycle",
                    child.id, self.id
                )));
            }
            ancestor = node.parent(cx);
        }

        let children = self.children(cx);
        let index = match index {
            Some(index) if index > children.len() => {
                return Err(Error::argument(format!(
                    "insertion index {} is out of bounds for {} children",
                    index,
                    children.len()
                )))
            }
            Some(index) => index,
            None => children.len(),
        };

        match session.filter(|_| self.is_locked()) {
            Some(session) => {
                let mut ctx = session.lock();
                ctx.model_mut(self.id)
                    .children
                    .get_or_insert(children)
                    .insert(index, Arc::clone(child));
            }
            None => self
                .structure
                .write()
                .children
                .insert(index, Arc::clone(child)),
        }

        match session {
            Some(session) => {
                let link = ParentLink::Attached(Arc::downgrade(self));
                session.lock().parents.insert(child.id, link);
            }
            None => child.structure.write().parent = Arc::downgrade(self),
        }
        Ok(())
    }

    /// Removes a child.
    pub fn remove(&self, cx: &ContextStack, child: &NodeRef) -> Result<()> {
        let session = self.structural_session(cx, child)?;

        let children = self.children(cx);
        let index = match children.iter().position(|c| c.id == child.id) {
            Some(index) => index,
            None => {
                return Err(Error::structure(format!(
                    "node {:?} is not a child of {:?}",
                    child.id, self.id
                )))
            }
        };

        match session.filter(|_| self.is_locked()) {
            Some(session) => {
                let mut ctx = session.lock();
                ctx.model_mut(self.id)
                    .children
                    .get_or_insert(children)
                    .remove(index);
            }
            None => {
                self.structure.write().children.remove(index);
            }
        }

        match session {
            Some(session) => {
                let has_shared_parent = child.structure.read().parent.upgrade().is_some();
                let mut ctx = session.lock();
                if has_shared_parent {
                    ctx.parents.insert(child.id, ParentLink::Detached);
                } else {
                    ctx.parents.remove(&child.id);
                }
            }
            None => child.structure.write().parent = Weak::new(),
        }
        Ok(())
    }

    /// Removes every effective child.
    pub fn remove_all(&self, cx: &ContextStack) -> Result<()> {
        for child in self.children(cx) {
            self.remove(cx, &child)?;
        }
        Ok(())
    }

    /// Returns the session a structural edit between this node and a child must be recorded in,
    /// or `None` if the edit goes to the shared structure.
    fn structural_session<'a>(
        &self,
        cx: &'a ContextStack,
        child: &Node,
    ) -> Result<Option<&'a Session>> {
        if !self.is_locked() && !child.is_locked() {
            return Ok(None);
        }
        match cx.active() {
            Some(session) => Ok(Some(session)),
            None => Err(Error::state(format!(
                "cannot mutate shared structure of locked node {:?} without a session",
                if self.is_locked() { self.id } else { child.id }
            ))),
        }
    }

    // state

    /// Returns the session whose model overrides this node's state, if any.
    fn overlay_session<'a>(&self, cx: &'a ContextStack) -> Option<&'a Session> {
        if self.is_locked() {
            cx.active()
        } else {
            None
        }
    }

    fn read<T>(
        &self,
        cx: &ContextStack,
        overlay: impl FnOnce(&ComponentModel) -> Option<T>,
        shared: impl FnOnce(&Defaults) -> T,
    ) -> T {
        if let Some(session) = self.overlay_session(cx) {
            let ctx = session.lock();
            if let Some(value) = ctx.model(self.id).and_then(overlay) {
                return value;
            }
        }
        shared(&self.defaults.read())
    }

    fn write(
        &self,
        cx: &ContextStack,
        overlay: impl FnOnce(&mut ComponentModel),
        shared: impl FnOnce(&mut Defaults),
    ) {
        match self.overlay_session(cx) {
            Some(session) => overlay(session.lock().model_mut(self.id)),
            None => shared(&mut self.defaults.write()),
        }
    }

    /// Drops an override without creating a model.
    fn clear(&self, cx: &ContextStack, overlay: impl FnOnce(&mut ComponentModel)) {
        if let Some(session) = self.overlay_session(cx) {
            if let Some(model) = session.lock().models.get_mut(&self.id) {
                overlay(model);
            }
        }
    }

    /// Returns the node's own visibility flag.
    pub fn visible(&self, cx: &ContextStack) -> bool {
        self.read(cx, |m| m.visible, |d| d.visible)
    }

    pub fn set_visible(&self, cx: &ContextStack, visible: bool) {
        self.write(cx, |m| m.visible = Some(visible), |d| d.visible = visible);
    }

    /// Drops the session's visibility override.
    pub fn restore_visible(&self, cx: &ContextStack) {
        self.clear(cx, |m| m.visible = None);
    }

    /// Returns true if this node and all of its effective ancestors are visible.
    pub fn is_showing(self: &Arc<Self>, cx: &ContextStack) -> bool {
        let mut node = Some(Arc::clone(self));
        while let Some(n) = node {
            if !n.widget.is_visible(&n, cx) {
                return false;
            }
            node = n.parent(cx);
        }
        true
    }

    pub fn attribute(&self, cx: &ContextStack, key: &str) -> Option<Value> {
        self.read(
            cx,
            |m| m.attributes.get(key).cloned(),
            |d| d.attributes.get(key).cloned(),
        )
    }

    pub fn set_attribute(&self, cx: &ContextStack, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.write(
            cx,
            |m| {
                m.attributes.insert(key.to_string(), Some(value.clone()));
            },
            |d| {
                d.attributes.insert(key.to_string(), value.clone());
            },
        );
    }

    /// Removes an attribute. Inside a session, this hides the shared attribute.
    pub fn remove_attribute(&self, cx: &ContextStack, key: &str) {
        self.write(
            cx,
            |m| {
                m.attributes.insert(key.to_string(), None);
            },
            |d| {
                d.attributes.remove(key);
            },
        );
    }

    /// Drops the session's override of an attribute.
    pub fn restore_attribute(&self, cx: &ContextStack, key: &str) {
        self.clear(cx, |m| {
            m.attributes.remove(key);
        });
    }

    pub fn flag(&self, cx: &ContextStack, name: &str) -> bool {
        self.read(
            cx,
            |m| m.flags.get(name).copied(),
            |d| d.flags.contains(name),
        )
    }

    pub fn set_flag(&self, cx: &ContextStack, name: &str, value: bool) {
        self.write(
            cx,
            |m| {
                m.flags.insert(name.to_string(), value);
            },
            |d| {
                if value {
                    d.flags.insert(name.to_string());
                } else {
                    d.flags.remove(name);
                }
            },
        );
    }

    pub fn restore_flag(&self, cx: &ContextStack, name: &str) {
        self.clear(cx, |m| {
            m.flags.remove(name);
        });
    }

    /// Returns a widget property.
    pub fn property(&self, cx: &ContextStack, key: &str) -> Option<Value> {
        self.read(
            cx,
            |m| m.properties.get(key).cloned().map(Some),
            |d| d.properties.get(key).cloned(),
        )
    }

    pub fn set_property(&self, cx: &ContextStack, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.write(
            cx,
            |m| {
                m.properties.insert(key.to_string(), value.clone());
            },
            |d| {
                d.properties.insert(key.to_string(), value.clone());
            },
        );
    }

    pub fn restore_property(&self, cx: &ContextStack, key: &str) {
        self.clear(cx, |m| {
            m.properties.remove(key);
        });
    }

    /// Returns true if the active session holds live overrides for this node.
    pub fn has_overrides(&self, cx: &ContextStack) -> bool {
        match cx.active() {
            Some(session) => session
                .lock()
                .model(self.id)
                .map_or(false, |m| !m.is_empty()),
            None => false,
        }
    }

    /// Returns true if this node shows its shared default state in the active session.
    pub fn is_default_state(self: &Arc<Self>, cx: &ContextStack) -> bool {
        !self.has_overrides(cx) && self.widget.is_default_state(self, cx)
    }

    /// Discards this node's model in the active session, and resets its subtree.
    ///
    /// Children placed under this node only inside the session are detached again, and shared
    /// children removed inside the session are restored.
    pub fn reset(&self, cx: &ContextStack) {
        let session = match cx.active() {
            Some(session) => session,
            None => return,
        };

        let shared = self.static_children();
        let mut children = self.children(cx);
        for child in &shared {
            if !children.iter().any(|c| c.id == child.id) {
                children.push(Arc::clone(child));
            }
        }

        let shared_parents: Vec<Option<NodeId>> = children
            .iter()
            .map(|c| c.structure.read().parent.upgrade().map(|p| p.id))
            .collect();

        {
            let mut ctx = session.lock();
            ctx.models.remove(&self.id);
            for (child, shared_parent) in children.iter().zip(shared_parents) {
                let other = match ctx.parents.remove(&child.id) {
                    Some(ParentLink::Attached(other)) => other.upgrade(),
                    _ => continue,
                };
                let other = match other {
                    Some(other) => other,
                    None => continue,
                };
                if other.id != self.id {
                    // a shared child moved elsewhere in this session comes back
                    if let Some(list) = ctx
                        .models
                        .get_mut(&other.id)
                        .and_then(|m| m.children.as_mut())
                    {
                        list.retain(|c| c.id != child.id);
                    }
                } else if shared_parent.map_or(false, |p| p != self.id) {
                    // moved here from another shared parent, which still does not list it
                    ctx.parents.insert(child.id, ParentLink::Detached);
                }
            }
        }

        for child in &children {
            child.reset(cx);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let structure = self.structure.read();
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &structure.name)
            .field("naming_context", &structure.naming_context)
            .field("locked", &self.is_locked())
            .field("children", &structure.children.len())
            .field("widget", &self.widget)
            .finish()
    }
}

/// Checks an explicit name.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(Error::argument("name must not be empty")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(Error::argument(format!(
                "name {:?} must start with a letter",
                name
            )))
        }
        Some(_) => (),
    }
    if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(Error::argument(format!(
            "name {:?} contains illegal character {:?}",
            name, c
        )));
    }
    Ok(())
}
