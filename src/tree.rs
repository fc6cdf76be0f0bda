//! The component tree and the request cycle.

use crate::config::Config;
use crate::context::ContextStack;
use crate::error::Result;
use crate::identity::NameRegistry;
use crate::lifecycle::Phase;
use crate::node::NodeRef;
use crate::paint::Painter;
use crate::request::Request;
use crate::session::Session;
use std::sync::Arc;
use tracing::{debug_span, trace, warn};

/// A locked tree of components, shared by every session.
#[derive(Debug)]
pub struct ComponentTree {
    root: NodeRef,
    config: Arc<Config>,
}

impl ComponentTree {
    /// Locks the tree under `root` and places it into service.
    pub fn new(root: NodeRef, config: Config) -> ComponentTree {
        root.lock();
        ComponentTree {
            root,
            config: Arc::new(config),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Creates a session for this tree.
    pub fn new_session(&self) -> Session {
        Session::new(Arc::clone(&self.config))
    }

    /// Creates an empty context stack that builds ids with this tree's configuration.
    pub fn context(&self) -> ContextStack {
        ContextStack::with_config(Arc::clone(&self.config))
    }

    /// Runs a full request cycle for a session: service, deferred work, prepare, paint.
    ///
    /// Blocks while another cycle runs on the same session. Any error aborts the cycle and
    /// discards the work it queued.
    pub fn process(
        &self,
        session: &Session,
        request: &mut Request,
        painter: &mut dyn Painter,
    ) -> Result<()> {
        let _gate = session.begin_request();
        let span = debug_span!("process", session = %session.id());
        let _enter = span.enter();

        let mut stack = self.context();
        let cx = stack.push(session.clone());
        session.lock().begin_cycle();

        let result = self.cycle(session, &cx, request, painter);
        if let Err(error) = &result {
            let discarded = session.lock().discard_deferred();
            warn!(%error, discarded, "request cycle aborted");
        }
        result
    }

    fn cycle(
        &self,
        session: &Session,
        cx: &ContextStack,
        request: &mut Request,
        painter: &mut dyn Painter,
    ) -> Result<()> {
        service_request(&self.root, cx, request)?;
        session.do_invoke_laters(cx)?;
        prepare_paint(&self.root, cx)?;
        paint(&self.root, cx, painter)
    }
}

enum Pass<'a> {
    Service(&'a mut Request),
    Prepare,
    Paint(&'a mut dyn Painter),
}

impl<'a> Pass<'a> {
    fn phase(&self) -> Phase {
        match self {
            Pass::Service(_) => Phase::Serviced,
            Pass::Prepare => Phase::Prepared,
            Pass::Paint(_) => Phase::Painted,
        }
    }
}

struct Walker<'a> {
    cx: &'a ContextStack,
    config: Arc<Config>,
    names: NameRegistry,
}

impl<'a> Walker<'a> {
    fn new(cx: &'a ContextStack) -> Walker<'a> {
        Walker {
            cx,
            config: Arc::clone(cx.config()),
            names: NameRegistry::new(),
        }
    }

    /// Visits a node and its effective subtree. Invisible subtrees are skipped entirely.
    fn visit(&mut self, node: &NodeRef, pass: &mut Pass) -> Result<()> {
        let cx = self.cx;
        let widget = node.widget();
        if !widget.is_visible(node, cx) {
            trace!(node = ?node.node_id(), "skipping invisible subtree");
            return Ok(());
        }
        if self.config.detect_duplicate_names {
            self.names.register(node, cx, &self.config)?;
        }

        match pass {
            Pass::Service(request) => widget.service(node, cx, &mut **request)?,
            Pass::Prepare => widget.prepare(node, cx)?,
            Pass::Paint(painter) => widget.paint(node, cx, &mut **painter)?,
        }
        if let Some(session) = cx.active() {
            session.lock().set_phase(node.node_id(), pass.phase());
        }

        // hooks may have restructured the node, so children are read afterwards
        for child in node.children(cx) {
            self.visit(&child, pass)?;
        }

        if let Pass::Paint(painter) = pass {
            widget.paint_end(node, cx, &mut **painter)?;
        }
        Ok(())
    }
}

/// Runs the service pass over the visible subtree under `node`.
pub fn service_request(node: &NodeRef, cx: &ContextStack, request: &mut Request) -> Result<()> {
    let span = debug_span!("service");
    let _enter = span.enter();
    Walker::new(cx).visit(node, &mut Pass::Service(request))
}

/// Runs the prepare pass over the visible subtree under `node`.
pub fn prepare_paint(node: &NodeRef, cx: &ContextStack) -> Result<()> {
    let span = debug_span!("prepare");
    let _enter = span.enter();
    Walker::new(cx).visit(node, &mut Pass::Prepare)
}

/// Runs the paint pass over the visible subtree under `node`.
pub fn paint(node: &NodeRef, cx: &ContextStack, painter: &mut dyn Painter) -> Result<()> {
    let span = debug_span!("paint");
    let _enter = span.enter();
    Walker::new(cx).visit(node, &mut Pass::Paint(painter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{PaintOp, Transcript};
    use crate::widgets::{Container, Label};

    #[test]
    fn phases_and_paint_order() {
        let cx = ContextStack::new();
        let root = Container::new();
        let label = Label::new("hello");
        let hidden = Label::new("hidden");
        root.add(&cx, &label).unwrap();
        root.add(&cx, &hidden).unwrap();
        hidden.set_visible(&cx, false);
        let tree = ComponentTree::new(root, Config::default());

        let session = tree.new_session();
        let mut transcript = Transcript::new();
        tree.process(&session, &mut Request::new(), &mut transcript)
            .unwrap();

        assert_eq!(
            transcript.ops(),
            &[
                PaintOp::Open("_0".into(), "div".into()),
                PaintOp::Open("_00".into(), "span".into()),
                PaintOp::Text("hello".into()),
                PaintOp::Close("span".into()),
                PaintOp::Close("div".into()),
            ][..]
        );

        let ctx = session.lock();
        assert_eq!(ctx.phase(label.node_id()), Phase::Painted);
        assert_eq!(
            ctx.phase(hidden.node_id()),
            Phase::Unvisited,
            "invisible nodes are never visited"
        );
    }

    #[test]
    fn ids_follow_the_tree_config() {
        let root = Container::new();
        root.set_name(Some("TEST")).unwrap();
        root.set_naming_context(true).unwrap();
        let x = Container::new();
        root.add(&ContextStack::new(), &x).unwrap();
        let config = Config {
            context_separator: ":".into(),
            ..Config::default()
        };
        let tree = ComponentTree::new(root, config);

        let mut stack = tree.context();
        assert_eq!(x.component_id(&stack).unwrap(), "TEST:_0");
        let session = tree.new_session();
        {
            let cx = stack.push(session.clone());
            assert_eq!(
                x.component_id(&cx).unwrap(),
                "TEST:_0",
                "ids should not change when a session is active"
            );
        }

        let mut transcript = Transcript::new();
        tree.process(&session, &mut Request::new(), &mut transcript)
            .unwrap();
        assert_eq!(transcript.opened_ids(), vec!["TEST", "TEST:_0"]);
    }
}
