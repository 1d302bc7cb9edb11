//! Choreo machine: one state machine per animated element.
//!
//! An element is described as a set of named states. Each state lists the
//! events it reacts to (see `choreo-grammar`); entering a state binds those
//! events on the host, and firing one runs its effects through the element's
//! job queue before moving on to the event's `goto` state.
//!
//! # Quick start
//!
//! ```rust
//! use std::rc::Rc;
//! use choreo_machine::prelude::*;
//!
//! let host = Rc::new(HeadlessHost::new());
//! let frames = Rc::new(FrameQueue::new());
//! let services = Services::new(host.clone(), Rc::new(StyleCache::new()), frames.clone());
//!
//! let el = ElementId(1);
//! let maestro = ElementBuilder::new(el, services)
//!     .state("default", "on click animate bounce go done")
//!     .state("done", "")
//!     .build();
//! maestro.start(true);
//!
//! host.dispatch(el, "click");
//! assert!(host.has_class(el, "bounce"));
//! host.dispatch(el, "animationend");
//! assert_eq!(maestro.current_state().as_deref(), Some("done"));
//! ```

pub mod element;
pub mod hooks;
pub mod maestro;

pub use element::{ElementBuilder, EventAttributes, ENTER_STATE, LEAVE_STATE};
pub use hooks::{Hook, HookCtx, HookRegistry, Hooks, NoHooks};
pub use maestro::Maestro;

/// Everything needed to bind and drive elements.
pub mod prelude {
    pub use crate::element::{ElementBuilder, EventAttributes};
    pub use crate::hooks::{HookCtx, HookRegistry, Hooks};
    pub use crate::maestro::Maestro;

    pub use choreo_engine::Services;
    pub use choreo_engine::config::EngineConfig;
    pub use choreo_engine::host::{ElementId, HeadlessHost, Host};
    pub use choreo_engine::style::{StyleCache, StyleEngine};
    pub use choreo_engine::time::{FrameQueue, Scheduler};
}

#[cfg(test)]
mod machine_tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use choreo_grammar::ast::{EventDescriptor, On, StateDescriptor};

    use crate::prelude::*;

    const EL: ElementId = ElementId(1);

    struct Fixture {
        host: Rc<HeadlessHost>,
        frames: Rc<FrameQueue>,
        styles: Rc<StyleCache>,
        hooks: Rc<Hooks>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                host: Rc::new(HeadlessHost::new()),
                frames: Rc::new(FrameQueue::new()),
                styles: Rc::new(StyleCache::new()),
                hooks: Rc::new(Hooks::new()),
            }
        }

        fn builder(&self) -> ElementBuilder {
            let services = Services::new(self.host.clone(), self.styles.clone(), self.frames.clone());
            ElementBuilder::new(EL, services).hooks(self.hooks.clone())
        }

        /// Counter bumped each time hook `name` runs.
        fn counter(&self, name: &str) -> Rc<Cell<u32>> {
            let count = Rc::new(Cell::new(0));
            let c = count.clone();
            self.hooks.register(name, move |_| c.set(c.get() + 1));
            count
        }

        fn click(&self) {
            self.host.dispatch(EL, "click");
        }

        fn animation_end(&self) {
            self.host.dispatch(EL, "animationend");
        }
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn click_enter_then_go() {
        let fx = Fixture::new();
        let m = fx
            .builder()
            .state("default", "on click enter move right over 0.5s go shown")
            .state("shown", "on click animate pulse")
            .build();
        m.start(true);
        fx.frames.tick();
        assert_eq!(m.current_state().as_deref(), Some("default"));
        assert!(fx.host.classes(EL).is_empty());

        fx.click();
        assert!(m.is_busy());
        let classes = fx.host.classes(EL);
        assert_eq!(classes.len(), 1);
        let transition = fx.styles.rule(&classes[0]).expect("transition rule");
        assert!(transition.contains("0.5s"), "{transition}");
        assert_eq!(m.current_state().as_deref(), Some("default"));

        fx.host.dispatch(EL, "transitionend");
        assert!(!m.is_busy());
        assert!(fx.host.classes(EL).is_empty());
        assert_eq!(m.current_state().as_deref(), Some("shown"));
        assert_eq!(fx.host.listener_count(EL, "click"), 1);

        fx.click();
        assert!(fx.host.has_class(EL, "pulse"));
    }

    #[test]
    fn autostart_runs_on_next_frame() {
        let fx = Fixture::new();
        let m = fx.builder().state("default", "animate spin").build();
        m.start(false);
        assert!(!fx.host.has_class(EL, "spin"));
        assert_eq!(fx.frames.pending(), 1);

        fx.frames.tick();
        assert!(fx.host.has_class(EL, "spin"));
        assert!(fx.host.has_class(EL, "animated"));
    }

    // ── transitions ───────────────────────────────────────────────────────

    #[test]
    fn outgoing_listeners_detach_before_target_fires() {
        let fx = Fixture::new();
        let m = fx
            .builder()
            .state("default", "on click go b on mouseenter animate wave")
            .state("b", "on click animate pulse")
            .build();
        m.start(false);
        assert_eq!(fx.host.total_listeners(EL), 2);

        fx.click();
        assert_eq!(m.current_state().as_deref(), Some("b"));
        assert_eq!(fx.host.listener_count(EL, "mouseenter"), 0);
        assert_eq!(fx.host.listener_count(EL, "click"), 1);
        // The click that caused the transition is not seen by `b`.
        assert!(!fx.host.has_class(EL, "pulse"));

        fx.host.dispatch(EL, "mouseenter");
        assert!(!fx.host.has_class(EL, "wave"));
        fx.click();
        assert!(fx.host.has_class(EL, "pulse"));
    }

    #[test]
    fn reentering_keeps_listeners_single() {
        let fx = Fixture::new();
        let m = fx.builder().state("default", "on click animate a").build();
        m.start(false);
        m.transition("default");
        m.transition("default");
        assert_eq!(fx.host.listener_count(EL, "click"), 1);
        assert_eq!(m.bound_listeners(), 1);
    }

    #[test]
    fn goto_self_reattaches_listener() {
        let fx = Fixture::new();
        let clicks = fx.counter("count");
        let m = fx
            .builder()
            .state_events("default", None, [EventAttributes::new().on("click").before("count").goto("default")])
            .build();
        m.start(false);

        fx.click();
        fx.click();
        assert_eq!(clicks.get(), 2);
        assert_eq!(fx.host.listener_count(EL, "click"), 1);
        assert_eq!(m.current_state().as_deref(), Some("default"));
    }

    #[test]
    fn reentering_reschedules_autostart() {
        let fx = Fixture::new();
        let runs = fx.counter("tick");
        let m = fx.builder().state_events("default", None, [EventAttributes::new().before("tick")]).build();
        m.start(false);
        m.transition("default");
        fx.frames.tick();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn unknown_state_has_no_bindings() {
        let fx = Fixture::new();
        let m = fx.builder().state("default", "on click animate a").build();
        m.start(false);
        m.transition("nowhere");
        assert_eq!(m.current_state().as_deref(), Some("nowhere"));
        assert_eq!(m.bound_listeners(), 0);
        assert_eq!(fx.host.total_listeners(EL), 0);
    }

    // ── actions ───────────────────────────────────────────────────────────

    #[test]
    fn multi_action_runs_in_order_then_goes_once() {
        let fx = Fixture::new();
        let after = fx.counter("after");
        let mut event = EventDescriptor::new(On::Event("click".into())).with_after("after()").with_goto("next");
        event.push_action("animate a");
        event.push_action("animate b");
        let m = fx.builder().descriptor(StateDescriptor::new("default", vec![event])).build();
        m.start(false);

        fx.click();
        assert!(fx.host.has_class(EL, "a"));
        assert!(!fx.host.has_class(EL, "b"));
        assert_eq!(m.queued_jobs(), 1);

        fx.animation_end();
        assert!(fx.host.has_class(EL, "b"));
        assert_eq!(m.current_state().as_deref(), Some("default"));
        assert_eq!(after.get(), 0);

        fx.animation_end();
        assert_eq!(m.current_state().as_deref(), Some("next"));
        assert_eq!(after.get(), 1);
    }

    #[test]
    fn no_runnable_effect_still_goes() {
        let fx = Fixture::new();
        let mut event = EventDescriptor::new(On::Event("click".into())).with_goto("next");
        event.push_action("animate");
        let m = fx.builder().descriptor(StateDescriptor::new("default", vec![event])).build();
        m.start(false);

        fx.click();
        assert!(!m.is_busy());
        assert_eq!(m.current_state().as_deref(), Some("next"));
    }

    #[test]
    fn hooks_run_around_the_action() {
        let fx = Fixture::new();
        let before = fx.counter("before");
        let after = fx.counter("after");
        let m = fx
            .builder()
            .state_events(
                "default",
                None,
                [EventAttributes::new().on("click").before("before()").after("after()").animate("pop").goto("done")],
            )
            .build();
        m.start(false);

        fx.click();
        assert_eq!((before.get(), after.get()), (1, 0));
        fx.animation_end();
        assert_eq!((before.get(), after.get()), (1, 1));
        assert_eq!(m.current_state().as_deref(), Some("done"));
    }

    #[test]
    fn unresolved_hooks_are_skipped() {
        let fx = Fixture::new();
        let m = fx
            .builder()
            .state_events("default", None, [EventAttributes::new().on("click").before("missing").goto("x")])
            .build();
        m.start(false);
        fx.click();
        assert_eq!(m.current_state().as_deref(), Some("x"));
    }

    // ── sequences ─────────────────────────────────────────────────────────

    #[test]
    fn three_step_sequence_resets_and_goes_once() {
        let fx = Fixture::new();
        let after = fx.counter("after");
        let m = fx
            .builder()
            .state_events(
                "default",
                None,
                [EventAttributes::new().on("click").animate("one two three").after("after").goto("done")],
            )
            .state("done", "")
            .build();
        m.start(false);

        fx.click();
        assert!(fx.host.has_class(EL, "one"));
        assert_eq!(m.current_step("default", 0), Some(0));

        for (step, name) in [(1, "two"), (2, "three")] {
            fx.animation_end();
            assert_eq!(after.get(), 0);
            assert_eq!(fx.frames.tick().ran, 1);
            assert!(fx.host.has_class(EL, name));
            assert_eq!(m.current_step("default", 0), Some(step));
        }

        fx.animation_end();
        assert_eq!(m.current_step("default", 0), None);
        assert_eq!(after.get(), 1);
        assert_eq!(m.current_state().as_deref(), Some("done"));
        assert!(fx.host.classes(EL).is_empty());
    }

    #[test]
    fn refiring_mid_sequence_still_goes_once() {
        let fx = Fixture::new();
        let after = fx.counter("after");
        let m = fx
            .builder()
            .state_events(
                "default",
                None,
                [EventAttributes::new().on("click").animate("one two three").after("after").goto("done")],
            )
            .state("done", "")
            .build();
        m.start(false);

        fx.click();
        fx.click();
        assert_eq!(m.current_step("default", 0), Some(1));
        assert_eq!(m.queued_jobs(), 1);

        for _ in 0..6 {
            fx.animation_end();
            fx.frames.tick();
        }
        assert_eq!(after.get(), 1);
        assert_eq!(m.current_step("default", 0), None);
        assert_eq!(m.current_state().as_deref(), Some("done"));
        assert!(fx.host.classes(EL).is_empty());
    }

    #[test]
    fn advancing_a_finished_sequence_does_nothing() {
        let fx = Fixture::new();
        let m = fx
            .builder()
            .state_events("default", None, [EventAttributes::new().on("click").animate("solo")])
            .build();
        m.start(false);

        fx.click();
        fx.click();
        assert_eq!(m.current_step("default", 0), Some(0));
        assert_eq!(m.queued_jobs(), 0);

        fx.animation_end();
        assert_eq!(m.current_step("default", 0), None);
        fx.click();
        assert_eq!(m.current_step("default", 0), Some(0));
    }

    // ── in-flight race ────────────────────────────────────────────────────

    #[test]
    fn finished_job_may_goto_from_superseded_state() {
        let fx = Fixture::new();
        let m = fx
            .builder()
            .state("default", "on click animate slow go b")
            .state("other", "on click animate x")
            .build();
        m.start(false);

        fx.click();
        m.transition("other");
        fx.animation_end();
        assert_eq!(m.current_state().as_deref(), Some("b"));
        assert_eq!(fx.host.total_listeners(EL), 0);
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn trigger_switches_state() {
        let fx = Fixture::new();
        let button = ElementId(2);
        fx.host.register_selector("#open", vec![button]);
        let m = fx
            .builder()
            .state("default", "")
            .state_with_trigger("open", "#open click", "animate unfold")
            .build();
        m.start(false);
        assert_eq!(fx.host.listener_count(button, "click"), 1);

        fx.host.dispatch(button, "click");
        assert_eq!(m.current_state().as_deref(), Some("open"));
        fx.frames.run_until_idle(4);
        assert!(fx.host.has_class(EL, "unfold"));
    }

    #[test]
    fn visibility_flips_between_enter_and_leave() {
        let fx = Fixture::new();
        let m = fx.builder().state("enter", "animate fade-in").state("leave", "animate fade-out").build();
        m.start(true);
        assert_eq!(m.current_state().as_deref(), Some("enter"));

        m.visibility_changed(true);
        assert_eq!(fx.frames.pending(), 1);
        m.visibility_changed(false);
        assert_eq!(m.current_state().as_deref(), Some("leave"));
        m.visibility_changed(true);
        assert_eq!(m.current_state().as_deref(), Some("enter"));
    }

    #[test]
    fn default_state_wins_at_start() {
        let fx = Fixture::new();
        let m = fx.builder().state("enter", "animate in").state("", "on click go enter").build();
        m.start(true);
        assert_eq!(m.current_state().as_deref(), Some("default"));
    }

    #[test]
    fn dropping_the_machine_detaches_everything() {
        let fx = Fixture::new();
        let button = ElementId(2);
        fx.host.register_selector(".btn", vec![button]);
        let m = fx
            .builder()
            .state("default", "on click animate a on mouseenter animate b")
            .state_with_trigger("other", ".btn click", "")
            .build();
        m.start(false);
        assert_eq!(fx.host.total_listeners(EL), 2);
        assert_eq!(fx.host.total_listeners(button), 1);

        drop(m);
        assert_eq!(fx.host.total_listeners(EL), 0);
        assert_eq!(fx.host.total_listeners(button), 0);
        assert_eq!(fx.frames.tick().ran, 1);
    }
}
