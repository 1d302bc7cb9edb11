//! Binding an element: registering its states and starting its machine.

use std::collections::HashMap;
use std::rc::Rc;

use choreo_engine::Services;
use choreo_engine::host::ElementId;
use choreo_grammar::ast::{EffectKind, EventDescriptor, On, StateDescriptor, Trigger, DEFAULT_STATE};
use choreo_grammar::parse_state_with_diagnostics;

use crate::hooks::{HookRegistry, NoHooks};
use crate::maestro::{EventSlot, Maestro};

/// State entered when the element scrolls into view.
pub const ENTER_STATE: &str = "enter";
/// State entered when the element scrolls out of view.
pub const LEAVE_STATE: &str = "leave";

// ── EventAttributes ───────────────────────────────────────────────────────

/// One event declared through separate attributes instead of a description
/// string. `animate` is a space-delimited list of keyframe names played one
/// after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttributes {
    pub on: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub animate: Option<String>,
    pub goto: Option<String>,
}

impl EventAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.on = Some(event.into());
        self
    }

    pub fn before(mut self, hook: impl Into<String>) -> Self {
        self.before = Some(hook.into());
        self
    }

    pub fn after(mut self, hook: impl Into<String>) -> Self {
        self.after = Some(hook.into());
        self
    }

    pub fn animate(mut self, steps: impl Into<String>) -> Self {
        self.animate = Some(steps.into());
        self
    }

    pub fn goto(mut self, state: impl Into<String>) -> Self {
        self.goto = Some(state.into());
        self
    }

    pub fn into_descriptor(self) -> EventDescriptor {
        let on = On::parse(self.on.as_deref().unwrap_or(""));
        let mut event = match self.animate {
            Some(steps) => EventDescriptor::sequence(on, EffectKind::Animate, steps),
            None => EventDescriptor::new(on),
        };
        if let Some(hook) = self.before {
            event = event.with_before(hook);
        }
        if let Some(hook) = self.after {
            event = event.with_after(hook);
        }
        if let Some(state) = self.goto {
            event = event.with_goto(state);
        }
        event
    }
}

// ── ElementBuilder ────────────────────────────────────────────────────────

/// Collects an element's states, then builds its [`Maestro`].
///
/// ```rust
/// use std::rc::Rc;
/// use choreo_engine::Services;
/// use choreo_engine::host::{ElementId, HeadlessHost};
/// use choreo_engine::style::StyleCache;
/// use choreo_engine::time::FrameQueue;
/// use choreo_machine::ElementBuilder;
///
/// let host = Rc::new(HeadlessHost::new());
/// let services = Services::new(host.clone(), Rc::new(StyleCache::new()), Rc::new(FrameQueue::new()));
/// let maestro = ElementBuilder::new(ElementId(1), services)
///     .state("default", "on click animate bounce go done")
///     .build();
/// maestro.start(true);
/// assert_eq!(maestro.current_state().as_deref(), Some("default"));
/// ```
pub struct ElementBuilder {
    element: ElementId,
    services: Services,
    hooks: Rc<dyn HookRegistry>,
    states: Vec<StateDescriptor>,
}

impl ElementBuilder {
    pub fn new(element: ElementId, services: Services) -> Self {
        Self { element, services, hooks: Rc::new(NoHooks), states: Vec::new() }
    }

    pub fn hooks(mut self, hooks: Rc<dyn HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Add a state from a description string. An empty name means `default`.
    pub fn state(self, name: &str, description: &str) -> Self {
        self.parsed(name, None, description)
    }

    /// Like [`state`](Self::state), entered when `trigger`
    /// (`"<selector> <event>"`) fires.
    pub fn state_with_trigger(self, name: &str, trigger: &str, description: &str) -> Self {
        self.parsed(name, Some(trigger), description)
    }

    /// Add a state from attribute-style events.
    pub fn state_events(
        self,
        name: &str,
        trigger: Option<&str>,
        events: impl IntoIterator<Item = EventAttributes>,
    ) -> Self {
        let events = events.into_iter().map(EventAttributes::into_descriptor).collect();
        let state = StateDescriptor::new(state_name(name), events).with_trigger(trigger.and_then(Trigger::parse));
        self.descriptor(state)
    }

    /// Add an already built state. A later state with the same name replaces
    /// an earlier one.
    pub fn descriptor(mut self, state: StateDescriptor) -> Self {
        self.states.retain(|s| s.name != state.name);
        self.states.push(state);
        self
    }

    fn parsed(self, name: &str, trigger: Option<&str>, description: &str) -> Self {
        let name = state_name(name);
        let (events, diagnostics) = parse_state_with_diagnostics(description);
        for d in &diagnostics {
            log::debug!("{:?} state {name:?}: {d}", self.element);
        }
        if let Some(raw) = trigger.filter(|t| Trigger::parse(t).is_none()) {
            log::warn!("{:?} state {name:?}: ignoring malformed trigger {raw:?}", self.element);
        }
        let state = StateDescriptor::new(name, events).with_trigger(trigger.and_then(Trigger::parse));
        self.descriptor(state)
    }

    pub fn build(self) -> Maestro {
        let mut states = HashMap::with_capacity(self.states.len());
        let mut triggers = Vec::new();
        for state in self.states {
            if let Some(trigger) = state.trigger {
                triggers.push((state.name.clone(), trigger));
            }
            states.insert(state.name, state.events.into_iter().map(EventSlot::new).collect());
        }
        Maestro::new(self.element, self.services, self.hooks, states, triggers)
    }
}

fn state_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() { DEFAULT_STATE.to_string() } else { name.to_string() }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────

impl Maestro {
    /// Install state triggers and enter the initial state.
    ///
    /// An element with `enter`/`leave` states but no `default` state enters
    /// `enter` right away when it starts visible. `default` is entered last,
    /// when it exists.
    pub fn start(&self, initially_visible: bool) {
        self.install_triggers();

        if self.tracks_visibility() {
            self.inner.visible.set(Some(initially_visible));
            if initially_visible && !self.has_state(DEFAULT_STATE) {
                self.transition(ENTER_STATE);
            }
        }
        if self.has_state(DEFAULT_STATE) {
            self.transition(DEFAULT_STATE);
        }
    }

    /// Report a viewport visibility change. Flips into `enter` or `leave`.
    pub fn visibility_changed(&self, visible: bool) {
        if !self.tracks_visibility() {
            return;
        }
        if self.inner.visible.replace(Some(visible)) == Some(visible) {
            return;
        }
        self.transition(if visible { ENTER_STATE } else { LEAVE_STATE });
    }

    fn tracks_visibility(&self) -> bool {
        self.has_state(ENTER_STATE) || self.has_state(LEAVE_STATE)
    }

    fn install_triggers(&self) {
        let pending = std::mem::take(&mut *self.inner.pending_triggers.borrow_mut());
        let host = self.inner.host();
        for (state, trigger) in pending {
            let Some(event) = trigger.on.event_name() else {
                log::warn!("trigger for state {state:?} needs a host event");
                continue;
            };
            let targets = host.select(&trigger.selector);
            if targets.is_empty() {
                log::debug!("trigger {:?} for state {state:?} matched nothing", trigger.selector);
            }
            let state: Rc<str> = Rc::from(state);
            for el in targets {
                let weak = Rc::downgrade(&self.inner);
                let st = state.clone();
                let id = host.add_listener(
                    el,
                    event,
                    Rc::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.transition(&st);
                        }
                    }),
                );
                self.inner.triggers.borrow_mut().push((el, id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_build_a_sequence() {
        let event = EventAttributes::new()
            .on("enter")
            .animate("bounce shake")
            .before("prep()")
            .goto("done")
            .into_descriptor();
        assert_eq!(event.on, On::Event("mouseenter".into()));
        assert_eq!(event.encoding, choreo_grammar::ActionEncoding::Sequence(EffectKind::Animate));
        assert_eq!(event.steps(), vec!["bounce", "shake"]);
        assert_eq!(event.before.as_deref(), Some("prep"));
        assert_eq!(event.goto.as_deref(), Some("done"));
    }

    #[test]
    fn attributes_without_on_autostart() {
        assert!(EventAttributes::new().into_descriptor().on.is_autostart());
    }

    #[test]
    fn empty_state_name_is_default() {
        assert_eq!(state_name("  "), DEFAULT_STATE);
        assert_eq!(state_name("open"), "open");
    }
}
