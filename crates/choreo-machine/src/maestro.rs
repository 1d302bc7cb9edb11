//! The per-element state machine.
//!
//! A [`Maestro`] owns one element's states, its job queue and the listeners
//! bound for the current state. Firing an event runs its `before` hook,
//! enqueues its effects, and once the last one finishes performs the goto
//! and the `after` hook.
//!
//! Every host-facing closure holds the machine weakly, and no `RefCell`
//! borrow is held across a host, hook or queue call, so hosts may dispatch
//! synchronously from any of them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use choreo_engine::Services;
use choreo_engine::host::{ElementId, Host, ListenerId};
use choreo_engine::job::build_job;
use choreo_engine::queue::{Job, JobQueue};
use choreo_grammar::ast::{ActionEncoding, Effect, EffectKind, EventDescriptor, On, Trigger};
use choreo_grammar::parse_effect;

use crate::hooks::{HookCtx, HookRegistry};

// ── Slots ─────────────────────────────────────────────────────────────────

/// One event of one state, plus its sequence position.
pub(crate) struct EventSlot {
    pub(crate) event: EventDescriptor,
    /// `None` when not mid-sequence, otherwise a valid step index.
    step: Cell<Option<usize>>,
}

impl EventSlot {
    pub(crate) fn new(event: EventDescriptor) -> Self {
        Self { event, step: Cell::new(None) }
    }
}

/// A listener slot of the current state. `listener` is `None` once the goto
/// logic detached it.
struct Binding {
    index: usize,
    listener: Option<ListenerId>,
}

pub(crate) struct Inner {
    element: ElementId,
    services: Services,
    hooks: Rc<dyn HookRegistry>,
    pub(crate) states: HashMap<String, Vec<EventSlot>>,
    queue: JobQueue,
    current: RefCell<Option<Rc<str>>>,
    bindings: RefCell<Vec<Binding>>,
    pub(crate) visible: Cell<Option<bool>>,
    /// State triggers waiting for `start`.
    pub(crate) pending_triggers: RefCell<Vec<(String, Trigger)>>,
    /// Listeners installed on other elements by state triggers.
    pub(crate) triggers: RefCell<Vec<(ElementId, ListenerId)>>,
}

// ── Maestro ───────────────────────────────────────────────────────────────

/// State machine for one element. Dropping it detaches every listener it
/// registered.
pub struct Maestro {
    pub(crate) inner: Rc<Inner>,
}

impl Maestro {
    pub(crate) fn new(
        element: ElementId,
        services: Services,
        hooks: Rc<dyn HookRegistry>,
        states: HashMap<String, Vec<EventSlot>>,
        triggers: Vec<(String, Trigger)>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                element,
                services,
                hooks,
                states,
                queue: JobQueue::new(),
                current: RefCell::new(None),
                bindings: RefCell::new(Vec::new()),
                visible: Cell::new(None),
                pending_triggers: RefCell::new(triggers),
                triggers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn element(&self) -> ElementId {
        self.inner.element
    }

    /// Switch to `state`, rebinding its events.
    pub fn transition(&self, state: &str) {
        self.inner.transition(state);
    }

    pub fn current_state(&self) -> Option<String> {
        self.inner.current.borrow().as_deref().map(str::to_string)
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.inner.states.contains_key(state)
    }

    /// Sequence position of event `index` in `state`.
    pub fn current_step(&self, state: &str, index: usize) -> Option<usize> {
        self.inner.slot(state, index).and_then(|s| s.step.get())
    }

    /// Listeners currently attached for the current state.
    pub fn bound_listeners(&self) -> usize {
        self.inner.bindings.borrow().iter().filter(|b| b.listener.is_some()).count()
    }

    /// `true` while one of this element's jobs is running.
    pub fn is_busy(&self) -> bool {
        self.inner.queue.is_running()
    }

    /// Jobs waiting behind the running one.
    pub fn queued_jobs(&self) -> usize {
        self.inner.queue.len()
    }
}

impl std::fmt::Debug for Maestro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maestro")
            .field("element", &self.inner.element)
            .field("current", &self.current_state())
            .finish_non_exhaustive()
    }
}

// ── Transitions ───────────────────────────────────────────────────────────

impl Inner {
    pub(crate) fn host(&self) -> Rc<dyn Host> {
        self.services.host.clone()
    }

    pub(crate) fn slot(&self, state: &str, index: usize) -> Option<&EventSlot> {
        self.states.get(state).and_then(|events| events.get(index))
    }

    pub(crate) fn transition(self: &Rc<Self>, target: &str) {
        let same = self.current.borrow().as_deref() == Some(target);
        if !same {
            let outgoing = std::mem::take(&mut *self.bindings.borrow_mut());
            for id in outgoing.into_iter().filter_map(|b| b.listener) {
                self.services.host.remove_listener(self.element, id);
            }
            *self.current.borrow_mut() = Some(Rc::from(target));
        }

        let Some(events) = self.states.get(target) else {
            log::debug!("{:?}: state {target:?} has no events", self.element);
            return;
        };
        log::debug!("{:?}: enter state {target:?}{}", self.element, if same { " (again)" } else { "" });

        let state: Rc<str> = Rc::from(target);
        for (index, slot) in events.iter().enumerate() {
            match &slot.event.on {
                On::Autostart => self.schedule(&state, index),
                On::Event(name) => {
                    if same && self.is_attached(index) {
                        continue;
                    }
                    let id = self.attach(&state, index, name);
                    let mut bindings = self.bindings.borrow_mut();
                    match bindings.iter_mut().find(|b| b.index == index) {
                        Some(b) => b.listener = Some(id),
                        None => bindings.push(Binding { index, listener: Some(id) }),
                    }
                }
            }
        }
    }

    fn is_attached(&self, index: usize) -> bool {
        self.bindings.borrow().iter().any(|b| b.index == index && b.listener.is_some())
    }

    fn attach(self: &Rc<Self>, state: &Rc<str>, index: usize, event: &str) -> ListenerId {
        let weak = Rc::downgrade(self);
        let state = state.clone();
        self.services.host.add_listener(
            self.element,
            event,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire(&state, index);
                }
            }),
        )
    }

    /// Run event `index` of `state` on the next frame.
    fn schedule(self: &Rc<Self>, state: &Rc<str>, index: usize) {
        let weak = Rc::downgrade(self);
        let state = state.clone();
        self.services.frames.next_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.fire(&state, index);
            }
        }));
    }

    fn detach(&self, index: usize) {
        let id = {
            let mut bindings = self.bindings.borrow_mut();
            bindings.iter_mut().find(|b| b.index == index).and_then(|b| b.listener.take())
        };
        if let Some(id) = id {
            self.services.host.remove_listener(self.element, id);
        }
    }

    fn detach_all(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        let triggers = std::mem::take(&mut *self.triggers.borrow_mut());
        let host = &self.services.host;
        for id in bindings.into_iter().filter_map(|b| b.listener) {
            host.remove_listener(self.element, id);
        }
        for (el, id) in triggers {
            host.remove_listener(el, id);
        }
    }
}

// ── Firing ────────────────────────────────────────────────────────────────

impl Inner {
    fn fire(self: &Rc<Self>, state: &Rc<str>, index: usize) {
        let Some(slot) = self.slot(state, index) else { return };
        let event = &slot.event;
        log::debug!("{:?}: fire {} in {state:?}", self.element, event.on);

        self.call_hook(event.before.as_deref(), state);

        if !event.has_action() {
            self.goto(state, index);
            return;
        }

        match event.encoding {
            ActionEncoding::MultiAction => self.run_actions(state, index),
            ActionEncoding::Sequence(kind) => self.advance_sequence(state, index, kind),
        }
    }

    /// Enqueue every effect of a multi-action event. The goto and `after`
    /// hook run once, when the last of them finishes.
    fn run_actions(self: &Rc<Self>, state: &Rc<str>, index: usize) {
        let Some(slot) = self.slot(state, index) else { return };

        let mut jobs: Vec<Job> = Vec::new();
        for token in slot.event.actions() {
            let Some(effect) = parse_effect(token) else {
                log::warn!("{:?}: skipping unknown effect {token:?}", self.element);
                continue;
            };
            jobs.extend(build_job(&self.services, self.element, &effect));
        }

        let Some(last) = jobs.pop() else {
            log::warn!("{:?}: no runnable effect in {:?}", self.element, slot.event.action);
            self.finish(state, index);
            return;
        };
        let weak = Rc::downgrade(self);
        let st = state.clone();
        jobs.push(last.on_finish(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish(&st, index);
            }
        }));

        for job in jobs {
            self.queue.enqueue(job);
        }
    }

    /// Run the next step of a space-delimited sequence.
    fn advance_sequence(self: &Rc<Self>, state: &Rc<str>, index: usize, kind: EffectKind) {
        let Some(slot) = self.slot(state, index) else { return };
        let steps = slot.event.steps();
        let next = slot.step.get().map_or(0, |s| s + 1);
        if next >= steps.len() {
            log::warn!("{:?}: sequence {:?} is already finished", self.element, slot.event.action);
            return;
        }
        slot.step.set(Some(next));

        let effect = Effect::step(kind, steps[next]);
        let Some(job) = build_job(&self.services, self.element, &effect) else {
            slot.step.set(None);
            return;
        };
        let weak = Rc::downgrade(self);
        let st = state.clone();
        self.queue.enqueue(job.on_finish(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish_step(&st, index, next);
            }
        }));
    }

    /// `step` is the step the finished job ran, not the cell's current
    /// value: a re-fire may already have moved the cell ahead.
    fn finish_step(self: &Rc<Self>, state: &Rc<str>, index: usize, step: usize) {
        let Some(slot) = self.slot(state, index) else { return };
        let last = slot.event.steps().len().saturating_sub(1);
        if step < last {
            self.schedule(state, index);
            return;
        }
        slot.step.set(None);
        self.finish(state, index);
    }

    fn finish(self: &Rc<Self>, state: &Rc<str>, index: usize) {
        self.goto(state, index);
        if let Some(slot) = self.slot(state, index) {
            self.call_hook(slot.event.after.as_deref(), state);
        }
    }

    /// Follow the event's goto, detaching its listener first.
    fn goto(self: &Rc<Self>, state: &Rc<str>, index: usize) {
        let Some(slot) = self.slot(state, index) else { return };
        let Some(target) = slot.event.goto.as_deref() else { return };

        // A job started in an earlier state must not detach this state's binding.
        let still_here = self.current.borrow().as_deref() == Some(&**state);
        if !slot.event.on.is_autostart() && still_here {
            self.detach(index);
        }
        self.transition(target);
    }

    fn call_hook(&self, name: Option<&str>, state: &str) {
        let Some(name) = name else { return };
        match self.hooks.resolve(name) {
            Some(hook) => hook(&HookCtx { element: self.element, state: state.to_string() }),
            None => log::trace!("{:?}: hook {name:?} not registered", self.element),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.detach_all();
    }
}
