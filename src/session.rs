//! Sessions.

use crate::config::Config;
use crate::context::ContextStack;
use crate::error::Result;
use crate::lifecycle::Phase;
use crate::model::{ComponentModel, ParentLink};
use crate::node::{NodeId, NodeRef};
use crate::value::Value;
use core::fmt;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, trace};
use uuid::Uuid;

/// A unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> SessionId {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Work queued during a request cycle, run after the service pass.
pub type Deferred = Box<dyn FnOnce(&ContextStack) -> Result<()> + Send>;

/// Per-session state: the overlay of component models over the shared tree, plus session-wide
/// facilities.
///
/// A session context is only ever touched by one thread at a time.
pub struct SessionContext {
    id: SessionId,
    pub(crate) models: HashMap<NodeId, ComponentModel>,
    /// Placement of nodes whose parent diverges from the shared structure.
    pub(crate) parents: HashMap<NodeId, ParentLink>,
    focus: Option<NodeRef>,
    focus_candidates: Vec<NodeRef>,
    /// Request-scoped scratch, cleared every cycle.
    scratch: HashMap<NodeId, HashMap<String, Value>>,
    /// Session-scoped scratch, kept across requests.
    session_maps: HashMap<NodeId, HashMap<String, Value>>,
    deferred: VecDeque<Deferred>,
    phases: HashMap<NodeId, Phase>,
    created_at: SystemTime,
    config: Arc<Config>,
}

impl SessionContext {
    fn new(config: Arc<Config>) -> SessionContext {
        SessionContext {
            id: SessionId::new(),
            models: HashMap::new(),
            parents: HashMap::new(),
            focus: None,
            focus_candidates: Vec::new(),
            scratch: HashMap::new(),
            session_maps: HashMap::new(),
            deferred: VecDeque::new(),
            phases: HashMap::new(),
            created_at: SystemTime::now(),
            config,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// The environment this session was created in.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Returns the component model of a node, if it has diverged in this session.
    pub fn model(&self, node: NodeId) -> Option<&ComponentModel> {
        self.models.get(&node)
    }

    /// Returns the number of component models in this session.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Returns the model for a node, creating an empty one if needed.
    pub(crate) fn model_mut(&mut self, node: NodeId) -> &mut ComponentModel {
        self.models.entry(node).or_default()
    }

    /// Discards every override in this session.
    pub fn reset(&mut self) {
        debug!(session = %self.id, models = self.models.len(), "resetting session context");
        self.models.clear();
        self.parents.clear();
        self.focus = None;
    }

    /// Returns the explicitly focused node.
    pub fn focus(&self) -> Option<&NodeRef> {
        self.focus.as_ref()
    }

    pub fn set_focus(&mut self, node: Option<NodeRef>) {
        self.focus = node;
    }

    /// Registers a node that may receive focus in this cycle.
    pub fn offer_focus(&mut self, node: NodeRef) {
        self.focus_candidates.push(node);
    }

    /// Nodes that offered to take focus during this cycle, in traversal order.
    pub fn focus_candidates(&self) -> &[NodeRef] {
        &self.focus_candidates
    }

    /// Returns the request-scoped scratch map of a node.
    pub fn scratch_map(&self, node: NodeId) -> Option<&HashMap<String, Value>> {
        self.scratch.get(&node)
    }

    pub fn scratch_map_mut(&mut self, node: NodeId) -> &mut HashMap<String, Value> {
        self.scratch.entry(node).or_default()
    }

    /// Clears all request-scoped scratch maps.
    pub fn clear_scratch_maps(&mut self) {
        self.scratch.clear();
    }

    /// Returns the session-scoped scratch map of a node, which survives across requests.
    pub fn session_map(&self, node: NodeId) -> Option<&HashMap<String, Value>> {
        self.session_maps.get(&node)
    }

    pub fn session_map_mut(&mut self, node: NodeId) -> &mut HashMap<String, Value> {
        self.session_maps.entry(node).or_default()
    }

    /// Queues work to run once the current service pass has finished.
    pub fn invoke_later<F>(&mut self, work: F)
    where
        F: 'static + FnOnce(&ContextStack) -> Result<()> + Send,
    {
        self.deferred.push_back(Box::new(work));
    }

    /// Returns the number of queued work items.
    pub fn pending_work(&self) -> usize {
        self.deferred.len()
    }

    /// Drops all queued work, returning how many items were dropped.
    pub(crate) fn discard_deferred(&mut self) -> usize {
        let count = self.deferred.len();
        self.deferred.clear();
        count
    }

    /// Returns how far a node got in the current cycle.
    pub fn phase(&self, node: NodeId) -> Phase {
        self.phases.get(&node).copied().unwrap_or(Phase::Unvisited)
    }

    pub(crate) fn set_phase(&mut self, node: NodeId, phase: Phase) {
        self.phases.insert(node, phase);
    }

    /// Clears everything that only lives for one request cycle.
    pub(crate) fn begin_cycle(&mut self) {
        self.scratch.clear();
        self.phases.clear();
        self.focus_candidates.clear();
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("models", &self.models)
            .field("parents", &self.parents.len())
            .field("focus", &self.focus.as_ref().map(|n| n.node_id()))
            .field("deferred", &self.deferred.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

struct SessionInner {
    id: SessionId,
    /// Held for the duration of a request cycle.
    gate: Mutex<()>,
    context: Mutex<SessionContext>,
}

/// A handle to a session context. Cheap to clone.
#[derive(Clone)]
pub struct Session(Arc<SessionInner>);

impl Session {
    /// Creates a new session.
    pub fn new(config: Arc<Config>) -> Session {
        let context = SessionContext::new(config);
        debug!(session = %context.id, "created session");
        Session(Arc::new(SessionInner {
            id: context.id,
            gate: Mutex::new(()),
            context: Mutex::new(context),
        }))
    }

    pub fn id(&self) -> SessionId {
        self.0.id
    }

    /// Locks the session context.
    ///
    /// The guard must not be held while calling into nodes, which lock it themselves.
    pub fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.0.context.lock()
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::clone(self.lock().config())
    }

    /// Discards every override in this session.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Queues work to run once the current service pass has finished.
    pub fn invoke_later<F>(&self, work: F)
    where
        F: 'static + FnOnce(&ContextStack) -> Result<()> + Send,
    {
        self.lock().invoke_later(work);
    }

    /// Runs queued work in FIFO order, including work queued while draining.
    ///
    /// Returns the number of items run. Stops at the first error; items after it stay queued.
    pub fn do_invoke_laters(&self, cx: &ContextStack) -> Result<usize> {
        let mut count = 0;
        loop {
            let work = self.lock().deferred.pop_front();
            match work {
                Some(work) => {
                    work(cx)?;
                    count += 1;
                }
                None => break,
            }
        }
        if count > 0 {
            trace!(session = %self.id(), count, "ran deferred work");
        }
        Ok(count)
    }

    /// Blocks until no other request cycle is running on this session.
    pub(crate) fn begin_request(&self) -> MutexGuard<'_, ()> {
        self.0.gate.lock()
    }

    pub fn ptr_eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Session({})", self.0.id)
    }
}
