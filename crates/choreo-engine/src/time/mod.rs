//! Frame scheduling.
//!
//! Autostart events and sequence steps resume "on the next animation frame".
//! The engine only sees the [`Scheduler`] trait; [`FrameQueue`] is a manual
//! implementation driven by calling `tick()`.

mod frame_queue;

pub use frame_queue::{FrameQueue, FrameTick};

/// Defers a callback to the next animation frame.
pub trait Scheduler {
    fn next_frame(&self, cb: Box<dyn FnOnce()>);
}
