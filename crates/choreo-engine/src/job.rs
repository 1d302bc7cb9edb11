//! Builds queue jobs for the three effect kinds.
//!
//! | Kind | Applied | Completes on | Removed on completion |
//! |------|---------|--------------|-----------------------|
//! | `enter` | initial class, flush, transition class, initial removed | transition end | transition class |
//! | `transform` | flush, target + transition classes | transition end | transition class |
//! | `animate` | flush, `<name>` + marker class | animation end | both |

use std::rc::{Rc, Weak};

use choreo_grammar::ast::{Effect, EffectKind};
use choreo_grammar::motion::parse_motion_with_diagnostics;

use crate::compile::{compile, AnimationDescriptor, CompiledStyle};
use crate::core::Services;
use crate::host::{ElementId, Host};
use crate::queue::{Done, Job};

/// Build the job running `effect` on `el`.
///
/// Returns `None` for an `animate` without a keyframe name.
pub fn build_job(services: &Services, el: ElementId, effect: &Effect) -> Option<Job> {
    let host = services.host.clone();
    let config = &services.config;

    let job = match effect.kind {
        EffectKind::Enter => {
            let desc = AnimationDescriptor::enter(&motion(effect), config);
            let CompiledStyle::Enter { initial, transition } = compile(&desc, &*services.styles) else {
                return None;
            };
            let end = config.transition_end.clone();
            Job::new(move |done| {
                host.add_class(el, &initial);
                host.flush_style(el);
                on_end(&host, el, &end, vec![transition.clone()], done);
                host.add_class(el, &transition);
                host.remove_class(el, &initial);
            })
        }
        EffectKind::Transform => {
            let desc = AnimationDescriptor::transform(&motion(effect), config);
            let CompiledStyle::Transform { target, transition } = compile(&desc, &*services.styles) else {
                return None;
            };
            let end = config.transition_end.clone();
            Job::new(move |done| {
                host.flush_style(el);
                on_end(&host, el, &end, vec![transition.clone()], done);
                host.add_class(el, &target);
                host.add_class(el, &transition);
            })
        }
        EffectKind::Animate => {
            let Some(name) = effect.keyframe() else {
                log::warn!("`animate` without a keyframe name in {:?}", effect.source);
                return None;
            };
            let classes = vec![name.to_string(), config.animated_class.clone()];
            let end = config.animation_end.clone();
            Job::new(move |done| {
                host.flush_style(el);
                on_end(&host, el, &end, classes.clone(), done);
                for class in &classes {
                    host.add_class(el, class);
                }
            })
        }
    };
    Some(job.label(effect.source.clone()))
}

fn motion(effect: &Effect) -> choreo_grammar::MotionAttrs {
    let (attrs, diagnostics) = parse_motion_with_diagnostics(&effect.source);
    for d in diagnostics {
        log::debug!("{:?}: {d}", effect.source);
    }
    attrs
}

/// Complete `done` on the next `event`, removing `classes` first.
///
/// The callback holds the host weakly; a host dropping its own pending
/// callbacks must not keep itself alive.
fn on_end(host: &Rc<dyn Host>, el: ElementId, event: &str, classes: Vec<String>, done: Done) {
    let weak: Weak<dyn Host> = Rc::downgrade(host);
    host.listen_once(
        el,
        event,
        Box::new(move || {
            if let Some(host) = weak.upgrade() {
                for class in &classes {
                    host.remove_class(el, class);
                }
            }
            done.complete();
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, HostOp};
    use crate::queue::JobQueue;
    use crate::style::StyleCache;
    use crate::time::FrameQueue;
    use choreo_grammar::parse_effect;
    use std::cell::Cell;

    const EL: ElementId = ElementId(1);

    fn fixture() -> (Rc<HeadlessHost>, Rc<StyleCache>, Services) {
        let host = Rc::new(HeadlessHost::new());
        let styles = Rc::new(StyleCache::new());
        let services = Services::new(host.clone(), styles.clone(), Rc::new(FrameQueue::new()));
        (host, styles, services)
    }

    fn run(services: &Services, src: &str) -> (JobQueue, Rc<Cell<bool>>) {
        let finished = Rc::new(Cell::new(false));
        let f = finished.clone();
        let effect = parse_effect(src).expect("effect");
        let job = build_job(services, EL, &effect).expect("job").on_finish(move || f.set(true));
        let queue = JobQueue::new();
        queue.enqueue(job);
        (queue, finished)
    }

    #[test]
    fn enter_swaps_initial_for_transition() {
        let (host, _, services) = fixture();
        let (queue, finished) = run(&services, "enter left move 40px");

        let ops = host.take_ops();
        let [HostOp::AddClass(_, initial), HostOp::FlushStyle(_), HostOp::AddClass(_, transition), HostOp::RemoveClass(_, removed)] =
            ops.as_slice()
        else {
            panic!("unexpected ops {ops:?}");
        };
        assert_eq!(initial, removed);
        assert!(host.has_class(EL, transition));
        assert!(!host.has_class(EL, initial));
        assert!(queue.is_running());
        assert!(!finished.get());

        host.dispatch(EL, "transitionend");
        assert!(finished.get());
        assert!(!queue.is_running());
        assert!(host.classes(EL).is_empty());
    }

    #[test]
    fn transform_keeps_target_class() {
        let (host, styles, services) = fixture();
        let (_queue, finished) = run(&services, "transform move right 10px");
        host.dispatch(EL, "transitionend");
        assert!(finished.get());

        let classes = host.classes(EL);
        assert_eq!(classes.len(), 1);
        assert_eq!(styles.rule(&classes[0]).as_deref(), Some("transform: translateX(10px);"));
    }

    #[test]
    fn animate_waits_for_animation_end() {
        let (host, _, services) = fixture();
        let (_queue, finished) = run(&services, "animate bounce");
        assert!(host.has_class(EL, "bounce"));
        assert!(host.has_class(EL, "animated"));

        host.dispatch(EL, "transitionend");
        assert!(!finished.get());
        host.dispatch(EL, "animationend");
        assert!(finished.get());
        assert!(host.classes(EL).is_empty());
    }

    #[test]
    fn completion_fires_once() {
        let (host, _, services) = fixture();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let effect = parse_effect("animate pulse").expect("effect");
        let queue = JobQueue::new();
        queue.enqueue(build_job(&services, EL, &effect).expect("job").on_finish(move || c.set(c.get() + 1)));
        host.dispatch(EL, "animationend");
        host.dispatch(EL, "animationend");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn end_event_names_come_from_config() {
        let (host, styles, _) = fixture();
        let services = Services::new(host.clone(), styles, Rc::new(FrameQueue::new()))
            .with_config(crate::config::EngineConfig::default().animation_end("webkitAnimationEnd"));
        let (_queue, finished) = run(&services, "animate spin");
        host.dispatch(EL, "animationend");
        assert!(!finished.get());
        host.dispatch(EL, "webkitAnimationEnd");
        assert!(finished.get());
    }

    #[test]
    fn animate_without_name_builds_nothing() {
        let (_, _, services) = fixture();
        let effect = parse_effect("animate").expect("effect");
        assert!(build_job(&services, EL, &effect).is_none());
    }
}
