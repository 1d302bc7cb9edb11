//! Host capability set.
//!
//! The engine never touches a real document. Everything it needs from the
//! platform (class toggling, listeners, end-of-effect signals, selector
//! lookup) goes through [`Host`]. [`HeadlessHost`] is an in-memory
//! implementation for tests and tools.

mod headless;

use std::rc::Rc;

pub use headless::{HeadlessHost, HostOp};

/// Opaque handle for one element owned by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(pub u64);

/// Handle for one listener registration; used to detach it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked every time the host dispatches the listened event.
pub type Listener = Rc<dyn Fn()>;

/// Callback invoked at most once.
pub type OnceCallback = Box<dyn FnOnce()>;

/// Platform operations the engine relies on.
///
/// Implementations may dispatch listeners synchronously from inside any of
/// these calls; the engine never holds internal borrows across them.
pub trait Host {
    fn add_class(&self, el: ElementId, class: &str);

    fn remove_class(&self, el: ElementId, class: &str);

    /// Force pending style changes to be computed, so a class applied just
    /// before is the start point of a following transition.
    fn flush_style(&self, el: ElementId) {
        let _ = el;
    }

    /// Call `cb` the next time `event` fires on `el`, then forget it.
    ///
    /// An enter transition animates both `transform` and `opacity`; a host
    /// that reports one end event per property should deliver only the
    /// `transform` one here.
    fn listen_once(&self, el: ElementId, event: &str, cb: OnceCallback);

    /// Call `cb` each time `event` fires on `el` until removed.
    fn add_listener(&self, el: ElementId, event: &str, cb: Listener) -> ListenerId;

    /// Detach a listener. Removing an unknown or already removed id is a no-op.
    fn remove_listener(&self, el: ElementId, id: ListenerId);

    /// Elements matching `selector`.
    fn select(&self, selector: &str) -> Vec<ElementId> {
        let _ = selector;
        Vec::new()
    }
}
