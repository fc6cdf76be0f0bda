//! Server-side component toolkit core.
//!
//! # Conceptual overview
//! An application assembles one tree of components (nodes) and then locks it. That single tree
//! serves every user session at once: each session sees and modifies its own logical copy of
//! the tree, without ever copying the tree itself.
//!
//! ## Nodes
//! A node holds the shared, session-independent parts of a component: its widget behavior, its
//! position in the tree, an optional explicit name, and default values for its visibility,
//! attributes, flags and properties. Before the tree is locked, nodes can be edited freely.
//! Once locked, the shared structure is read-only and can be read by any number of threads.
//!
//! ## Sessions and component models
//! A session context stores overrides per node, in component models. Reading a value consults
//! the active session's model first and falls back to the shared default; writing a value
//! creates a model on demand. A node without a model is in its *default state*.
//!
//! Structural edits on a locked node work the same way: the first edit in a session copies the
//! node's effective child list into its model, and further edits change the copy. Other
//! sessions keep seeing the shared list.
//!
//! ## The context stack
//! Node operations never look up a session implicitly. They take a [`ContextStack`], and act
//! on behalf of its innermost session. Sessions are pushed with a guard that pops them again on
//! every exit path, so a failing request cannot leave a stale session behind.
//!
//! ## Ids
//! Every node has a component id derived from its names and its position among the effective
//! siblings, scoped by the nearest naming context, and an internal id derived purely from its
//! position. See [`identity`].
//!
//! ## Request cycles
//! A request cycle walks the effective tree three times: service (consume request data),
//! prepare (compute display state), and paint (produce output). Subtrees whose root is invisible
//! are skipped entirely. Work queued during the service pass runs after it, in order.
//!
//! ## Threads
//! Any number of threads may process requests for different sessions at once. A session itself
//! is only used by one request cycle at a time. [`Host`] runs cycles on a pool of workers.

mod config;
mod context;
mod error;
mod host;
pub mod identity;
mod lifecycle;
mod model;
mod node;
mod paint;
mod request;
mod session;
mod tree;
mod value;
pub mod widgets;

pub use config::Config;
pub use context::{ContextGuard, ContextStack};
pub use error::{Error, Result};
pub use host::Host;
pub use lifecycle::{Lifecycle, Phase};
pub use model::ComponentModel;
pub use node::{validate_name, Node, NodeId, NodeRef};
pub use paint::{PaintOp, Painter, Transcript};
pub use request::Request;
pub use session::{Deferred, Session, SessionContext, SessionId};
pub use tree::{paint, prepare_paint, service_request, ComponentTree};
pub use value::Value;
