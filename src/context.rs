//! The stack of active sessions.

use crate::config::Config;
use crate::session::Session;
use core::ops::{Deref, DerefMut};
use std::sync::Arc;

/// The sessions active during one request-processing call, innermost last.
///
/// Every node operation takes the stack explicitly and acts on behalf of the innermost session.
/// Sessions can only be pushed through [`ContextStack::push`], which returns a guard that pops
/// the session again when it goes out of scope.
///
/// The stack also carries the configuration ids are built with, so a node's id does not depend
/// on whether a session is active. Use [`ComponentTree::context`](crate::ComponentTree::context)
/// to get a stack configured like the tree.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Session>,
    config: Arc<Config>,
}

impl ContextStack {
    /// Creates an empty stack with the default configuration.
    pub fn new() -> ContextStack {
        ContextStack::default()
    }

    /// Creates an empty stack with the given configuration.
    pub fn with_config(config: Arc<Config>) -> ContextStack {
        ContextStack {
            frames: Vec::new(),
            config,
        }
    }

    /// Makes a session active until the returned guard is dropped.
    pub fn push(&mut self, session: Session) -> ContextGuard<'_> {
        self.frames.push(session);
        ContextGuard { stack: self }
    }

    /// Returns the innermost active session.
    pub fn active(&self) -> Option<&Session> {
        self.frames.last()
    }

    /// Returns the number of active sessions.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }
}

/// Keeps a session on the stack. Pops it when dropped.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    stack: &'a mut ContextStack,
}

impl<'a> ContextGuard<'a> {
    /// Pops the session now.
    pub fn pop(self) {}
}

impl<'a> Deref for ContextGuard<'a> {
    type Target = ContextStack;
    fn deref(&self) -> &ContextStack {
        self.stack
    }
}

impl<'a> DerefMut for ContextGuard<'a> {
    fn deref_mut(&mut self) -> &mut ContextStack {
        self.stack
    }
}

impl<'a> Drop for ContextGuard<'a> {
    fn drop(&mut self) {
        self.stack.frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Arc::new(Config::default()))
    }

    #[test]
    fn nested_push_and_pop() {
        let outer = session();
        let inner = session();
        let mut stack = ContextStack::new();
        assert!(stack.active().is_none());

        {
            let mut guard = stack.push(outer.clone());
            assert!(guard.active().unwrap().ptr_eq(&outer));
            {
                let guard = guard.push(inner.clone());
                assert!(guard.active().unwrap().ptr_eq(&inner));
                assert_eq!(guard.depth(), 2);
            }
            assert!(
                guard.active().unwrap().ptr_eq(&outer),
                "dropping the inner guard should restore the outer session"
            );
            guard.pop();
        }

        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pops_on_early_return() {
        fn fails(stack: &mut ContextStack, session: Session) -> Result<(), ()> {
            let _guard = stack.push(session);
            Err(())
        }

        let mut stack = ContextStack::new();
        assert!(fails(&mut stack, session()).is_err());
        assert_eq!(stack.depth(), 0, "the guard should pop on every exit path");
    }

    #[test]
    fn config_does_not_depend_on_the_session() {
        let config = Arc::new(Config {
            context_separator: ":".into(),
            ..Config::default()
        });
        let mut stack = ContextStack::with_config(Arc::clone(&config));
        assert_eq!(stack.config().context_separator, ":");

        let guard = stack.push(session());
        assert_eq!(
            guard.config().context_separator,
            ":",
            "a pushed session should not change the configuration"
        );
    }
}
