use arbor::widgets::{Container, Label, Table, TextField};
use arbor::{
    ComponentTree, Config, ContextStack, Error, Lifecycle, Node, NodeRef, PaintOp, Phase,
    Request, Result, Transcript, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every hook invocation.
#[derive(Debug)]
struct Probe {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    fn node(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> NodeRef {
        Node::new(Probe {
            name,
            log: Arc::clone(log),
        })
    }
}

impl Lifecycle for Probe {
    fn service(&self, _: &NodeRef, _: &ContextStack, _: &mut Request) -> Result<()> {
        self.log.lock().push(format!("service {}", self.name));
        Ok(())
    }

    fn prepare(&self, _: &NodeRef, _: &ContextStack) -> Result<()> {
        self.log.lock().push(format!("prepare {}", self.name));
        Ok(())
    }
}

#[test]
fn invisible_subtrees_are_skipped() {
    let cx = ContextStack::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let p = Probe::node("p", &log);
    let a = Probe::node("a", &log);
    let c = Probe::node("c", &log);
    let c_child = Probe::node("c.child", &log);
    let d = Probe::node("d", &log);
    p.add(&cx, &a).unwrap();
    p.add(&cx, &c).unwrap();
    p.add(&cx, &d).unwrap();
    c.add(&cx, &c_child).unwrap();
    c.set_visible(&cx, false);
    let tree = ComponentTree::new(p, Config::default());

    let session = tree.new_session();
    tree.process(&session, &mut Request::new(), &mut Transcript::new())
        .unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "service p", "service a", "service d", "prepare p", "prepare a", "prepare d",
        ],
        "c and its child should never be serviced or prepared"
    );
    assert_eq!(session.lock().phase(c_child.node_id()), Phase::Unvisited);
}

#[test]
fn session_visibility_overrides_the_default() {
    let mut stack = ContextStack::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let root = Probe::node("root", &log);
    let hidden = Probe::node("hidden", &log);
    let shown = Probe::node("shown", &log);
    root.add(&stack, &hidden).unwrap();
    root.add(&stack, &shown).unwrap();
    hidden.set_visible(&stack, false);
    let tree = ComponentTree::new(root, Config::default());

    let session = tree.new_session();
    {
        let cx = stack.push(session.clone());
        hidden.set_visible(&cx, true);
        shown.set_visible(&cx, false);
        assert!(hidden.is_showing(&cx));
        assert!(!shown.is_showing(&cx));
    }
    tree.process(&session, &mut Request::new(), &mut Transcript::new())
        .unwrap();

    let log = log.lock();
    assert!(log.contains(&"service hidden".to_string()));
    assert!(!log.contains(&"service shown".to_string()));
}

#[test]
fn positional_id_under_naming_context() {
    let cx = ContextStack::new();
    let root = Container::new();
    root.set_name(Some("TEST")).unwrap();
    root.set_naming_context(true).unwrap();
    let x = Container::new();
    root.add(&cx, &x).unwrap();
    let tree = ComponentTree::new(root, Config::default());

    let config = tree.config();
    let expected = format!(
        "TEST{}{}0",
        config.context_separator, config.framework_separator
    );
    assert_eq!(x.component_id(&tree.context()).unwrap(), expected);
}

#[test]
fn duplicate_names_fail_the_walk() {
    let cx = ContextStack::new();
    let root = Container::new();
    let a = Label::new("a");
    let b = Label::new("b");
    a.set_name(Some("twin")).unwrap();
    b.set_name(Some("twin")).unwrap();
    root.add(&cx, &a).unwrap();
    root.add(&cx, &b).unwrap();
    let tree = ComponentTree::new(root, Config::default());

    let session = tree.new_session();
    match tree.process(&session, &mut Request::new(), &mut Transcript::new()) {
        Err(Error::System(_)) => (),
        other => panic!("expected a system error, got {:?}", other),
    }

    let mut stack = ContextStack::new();
    let cx = stack.push(session.clone());
    b.set_visible(&cx, false);
    drop(cx);
    tree.process(&session, &mut Request::new(), &mut Transcript::new())
        .expect("an invisible duplicate is never traversed");
}

#[test]
fn text_fields_consume_their_parameters() {
    let cx = ContextStack::new();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let root = Container::new();
    root.set_name(Some("form")).unwrap();
    root.set_naming_context(true).unwrap();

    let on_change = {
        let changes = Arc::clone(&changes);
        Arc::new(move |node: &NodeRef, cx: &ContextStack, value: &Value| -> Result<()> {
            changes.lock().push((node.component_id(cx)?, value.clone()));
            Ok(())
        })
    };
    let name = TextField::with_listener(on_change.clone());
    name.set_name(Some("name")).unwrap();
    let secret = TextField::with_listener(on_change);
    secret.set_name(Some("secret")).unwrap();
    secret.set_visible(&cx, false);
    root.add(&cx, &name).unwrap();
    root.add(&cx, &secret).unwrap();
    let tree = ComponentTree::new(root, Config::default());

    let session = tree.new_session();
    let mut request = Request::new()
        .with("form-name", "Ada")
        .with("form-secret", "hunter2");
    let mut transcript = Transcript::new();
    tree.process(&session, &mut request, &mut transcript).unwrap();

    assert_eq!(
        request.remaining().collect::<Vec<_>>(),
        vec!["form-secret"],
        "invisible fields do not consume parameters"
    );
    assert_eq!(
        *changes.lock(),
        vec![("form-name".to_string(), Value::from("Ada"))],
        "listeners run after the service pass"
    );
    assert!(transcript
        .ops()
        .contains(&PaintOp::Attribute("value".into(), Value::from("Ada"))));

    {
        let ctx = session.lock();
        let candidates: Vec<_> = ctx
            .focus_candidates()
            .iter()
            .map(|n| n.node_id())
            .collect();
        assert_eq!(candidates, vec![name.node_id()], "hidden fields cannot take focus");
    }

    let mut stack = ContextStack::new();
    let fresh = tree.new_session();
    let cx = stack.push(fresh);
    assert_eq!(
        TextField::value(&name, &cx),
        None,
        "other sessions do not see the input"
    );
}

#[test]
fn table_paging() {
    let mut stack = ContextStack::new();
    let table = Table::new();
    let rows: Vec<_> = (0..5).map(|i| Label::new(&format!("row {}", i))).collect();
    for row in &rows {
        table.add(&stack, row).unwrap();
    }
    Table::set_page_size(&table, &stack, 2).unwrap();
    match Table::set_page_size(&table, &stack, -1) {
        Err(Error::Argument(_)) => (),
        other => panic!("negative page sizes should be rejected, got {:?}", other),
    }
    let tree = ComponentTree::new(table, Config::default());
    let table = tree.root();

    let session = tree.new_session();
    let id = table.component_id(&stack).unwrap();
    let mut transcript = Transcript::new();
    tree.process(&session, &mut Request::new().with(id.as_str(), "1"), &mut transcript)
        .unwrap();
    assert_eq!(transcript.painted_text(), "row 2row 3");

    match tree.process(
        &session,
        &mut Request::new().with(id.as_str(), "-3"),
        &mut Transcript::new(),
    ) {
        Err(Error::Argument(_)) => (),
        other => panic!("negative pages should be rejected, got {:?}", other),
    }
    match tree.process(
        &session,
        &mut Request::new().with(id.as_str(), "last"),
        &mut Transcript::new(),
    ) {
        Err(Error::System(_)) => (),
        other => panic!("non-numeric pages should be rejected, got {:?}", other),
    }

    let cx = stack.push(session.clone());
    assert_eq!(Table::page(table, &cx).unwrap(), 1);
    assert_eq!(Table::page_count(table, &cx).unwrap(), 3);
    assert!(!rows[0].visible(&cx));
    drop(cx);

    let other = tree.new_session();
    let mut transcript = Transcript::new();
    tree.process(&other, &mut Request::new(), &mut transcript)
        .unwrap();
    assert_eq!(
        transcript.painted_text(),
        "row 0row 1",
        "paging state is per session"
    );
}

#[test]
fn deferred_work_runs_between_service_and_prepare() {
    #[derive(Debug)]
    struct Deferring(Arc<Mutex<Vec<&'static str>>>);

    impl Lifecycle for Deferring {
        fn service(&self, _: &NodeRef, cx: &ContextStack, _: &mut Request) -> Result<()> {
            self.0.lock().push("service");
            let log = Arc::clone(&self.0);
            if let Some(session) = cx.active() {
                session.invoke_later(move |_| {
                    log.lock().push("deferred");
                    Ok(())
                });
            }
            Ok(())
        }

        fn prepare(&self, _: &NodeRef, _: &ContextStack) -> Result<()> {
            self.0.lock().push("prepare");
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let tree = ComponentTree::new(Node::new(Deferring(Arc::clone(&log))), Config::default());
    let session = tree.new_session();
    tree.process(&session, &mut Request::new(), &mut Transcript::new())
        .unwrap();

    assert_eq!(*log.lock(), vec!["service", "deferred", "prepare"]);
    assert_eq!(session.lock().pending_work(), 0);
}

#[test]
fn aborted_cycles_drop_their_deferred_work() {
    #[derive(Debug)]
    struct Flaky(Arc<Mutex<Vec<String>>>);

    impl Lifecycle for Flaky {
        fn service(&self, _: &NodeRef, cx: &ContextStack, request: &mut Request) -> Result<()> {
            let label = request.take("label").unwrap_or_default();
            let log = Arc::clone(&self.0);
            if let Some(session) = cx.active() {
                let label = label.clone();
                session.invoke_later(move |_| {
                    log.lock().push(label);
                    Ok(())
                });
            }
            if label == "fail" {
                return Err(Error::Argument("refusing the request".into()));
            }
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let tree = ComponentTree::new(Node::new(Flaky(Arc::clone(&log))), Config::default());
    let session = tree.new_session();

    let failed = tree.process(
        &session,
        &mut Request::new().with("label", "fail"),
        &mut Transcript::new(),
    );
    assert!(failed.is_err());
    assert_eq!(session.lock().pending_work(), 0, "queued work is discarded");

    tree.process(
        &session,
        &mut Request::new().with("label", "ok"),
        &mut Transcript::new(),
    )
    .unwrap();
    assert_eq!(*log.lock(), vec!["ok".to_string()]);
}

#[test]
fn widgets_take_part_in_default_state() {
    #[derive(Debug)]
    struct Dirty;

    impl Lifecycle for Dirty {
        fn is_default_state(&self, _: &NodeRef, _: &ContextStack) -> bool {
            false
        }
    }

    let mut stack = ContextStack::new();
    let root = Container::new();
    let dirty = Node::new(Dirty);
    root.add(&stack, &dirty).unwrap();
    let tree = ComponentTree::new(root, Config::default());

    let cx = stack.push(tree.new_session());
    assert!(!dirty.has_overrides(&cx), "the node has no model");
    assert!(
        !dirty.is_default_state(&cx),
        "the widget can veto default state"
    );
    assert!(tree.root().is_default_state(&cx));
    assert_eq!(cx.active().unwrap().lock().model_count(), 0);
}
