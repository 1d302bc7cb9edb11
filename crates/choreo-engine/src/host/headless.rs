use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::{ElementId, Host, Listener, ListenerId, OnceCallback};

/// A class or style operation recorded by [`HeadlessHost`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    AddClass(ElementId, String),
    RemoveClass(ElementId, String),
    FlushStyle(ElementId),
}

struct Registered {
    id: ListenerId,
    el: ElementId,
    event: String,
    cb: Listener,
}

struct Pending {
    el: ElementId,
    event: String,
    cb: OnceCallback,
}

#[derive(Default)]
struct State {
    next_listener: u64,
    classes: HashMap<ElementId, BTreeSet<String>>,
    listeners: Vec<Registered>,
    once: Vec<Pending>,
    selectors: HashMap<String, Vec<ElementId>>,
    ops: Vec<HostOp>,
}

/// In-memory [`Host`].
///
/// Nothing happens by itself: events (including transition and animation
/// ends) fire only when [`dispatch`](Self::dispatch) is called, which makes
/// every suspension point explicit in tests.
#[derive(Default)]
pub struct HeadlessHost {
    state: RefCell<State>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `selector` resolve to `elements` in [`Host::select`].
    pub fn register_selector(&self, selector: impl Into<String>, elements: Vec<ElementId>) {
        self.state.borrow_mut().selectors.insert(selector.into(), elements);
    }

    /// Fire `event` on `el`. Returns how many callbacks ran.
    ///
    /// Listeners registered during the dispatch do not see it; listeners
    /// removed during the dispatch are not called.
    pub fn dispatch(&self, el: ElementId, event: &str) -> usize {
        let (persistent, once) = {
            let mut s = self.state.borrow_mut();
            let persistent: Vec<(ListenerId, Listener)> = s
                .listeners
                .iter()
                .filter(|l| l.el == el && l.event == event)
                .map(|l| (l.id, l.cb.clone()))
                .collect();
            let (fired, kept): (Vec<Pending>, Vec<Pending>) =
                s.once.drain(..).partition(|p| p.el == el && p.event == event);
            s.once = kept;
            (persistent, fired)
        };

        let mut ran = 0;
        for p in once {
            (p.cb)();
            ran += 1;
        }
        for (id, cb) in persistent {
            if self.is_registered(id) {
                cb();
                ran += 1;
            }
        }
        ran
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.state.borrow().listeners.iter().any(|l| l.id == id)
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.state.borrow().classes.get(&el).is_some_and(|c| c.contains(class))
    }

    /// Current classes of `el`, sorted.
    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.state
            .borrow()
            .classes
            .get(&el)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Persistent listeners for `event` on `el`.
    pub fn listener_count(&self, el: ElementId, event: &str) -> usize {
        self.state.borrow().listeners.iter().filter(|l| l.el == el && l.event == event).count()
    }

    /// All persistent listeners on `el`.
    pub fn total_listeners(&self, el: ElementId) -> usize {
        self.state.borrow().listeners.iter().filter(|l| l.el == el).count()
    }

    /// One-shot callbacks still waiting for `event` on `el`.
    pub fn pending_once(&self, el: ElementId, event: &str) -> usize {
        self.state.borrow().once.iter().filter(|p| p.el == el && p.event == event).count()
    }

    /// Drain the recorded class/style operations.
    pub fn take_ops(&self) -> Vec<HostOp> {
        std::mem::take(&mut self.state.borrow_mut().ops)
    }
}

impl Host for HeadlessHost {
    fn add_class(&self, el: ElementId, class: &str) {
        let mut s = self.state.borrow_mut();
        // Space-separated lists behave like `classList.add(...names)`.
        for name in class.split_whitespace() {
            s.classes.entry(el).or_default().insert(name.to_string());
        }
        s.ops.push(HostOp::AddClass(el, class.to_string()));
    }

    fn remove_class(&self, el: ElementId, class: &str) {
        let mut s = self.state.borrow_mut();
        if let Some(set) = s.classes.get_mut(&el) {
            for name in class.split_whitespace() {
                set.remove(name);
            }
        }
        s.ops.push(HostOp::RemoveClass(el, class.to_string()));
    }

    fn flush_style(&self, el: ElementId) {
        self.state.borrow_mut().ops.push(HostOp::FlushStyle(el));
    }

    fn listen_once(&self, el: ElementId, event: &str, cb: OnceCallback) {
        self.state.borrow_mut().once.push(Pending { el, event: event.to_string(), cb });
    }

    fn add_listener(&self, el: ElementId, event: &str, cb: Listener) -> ListenerId {
        let mut s = self.state.borrow_mut();
        s.next_listener += 1;
        let id = ListenerId(s.next_listener);
        s.listeners.push(Registered { id, el, event: event.to_string(), cb });
        id
    }

    fn remove_listener(&self, el: ElementId, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|l| !(l.el == el && l.id == id));
    }

    fn select(&self, selector: &str) -> Vec<ElementId> {
        self.state.borrow().selectors.get(selector).cloned().unwrap_or_default()
    }
}
