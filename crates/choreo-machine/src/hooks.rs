//! Named callbacks run before and after an event's action.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use choreo_engine::host::ElementId;

/// What a hook is told about the firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCtx {
    pub element: ElementId,
    /// State whose event fired.
    pub state: String,
}

pub type Hook = Rc<dyn Fn(&HookCtx)>;

/// Resolves hook names at call time. Unknown names are simply skipped.
pub trait HookRegistry {
    fn resolve(&self, name: &str) -> Option<Hook>;
}

/// Map-backed [`HookRegistry`]; hooks may be registered after binding.
#[derive(Default)]
pub struct Hooks {
    hooks: RefCell<HashMap<String, Hook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under `name`, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, hook: impl Fn(&HookCtx) + 'static) {
        self.hooks.borrow_mut().insert(name.into(), Rc::new(hook));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.hooks.borrow_mut().remove(name).is_some()
    }
}

impl HookRegistry for Hooks {
    fn resolve(&self, name: &str) -> Option<Hook> {
        self.hooks.borrow().get(name).cloned()
    }
}

/// A registry that knows no hooks.
pub struct NoHooks;

impl HookRegistry for NoHooks {
    fn resolve(&self, _name: &str) -> Option<Hook> {
        None
    }
}
