use std::cell::{Cell, RefCell};

use super::Scheduler;

/// Result of one [`FrameQueue::tick`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameTick {
    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,

    /// Callbacks run during this frame.
    pub ran: usize,
}

/// Manually ticked [`Scheduler`].
///
/// Callbacks scheduled while a frame runs land in the following frame, the
/// same way `requestAnimationFrame` behaves.
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<Vec<Box<dyn FnOnce()>>>,
    frame_index: Cell<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run every callback scheduled before this call.
    pub fn tick(&self) -> FrameTick {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let frame_index = self.frame_index.get();
        self.frame_index.set(frame_index.wrapping_add(1));

        let ran = batch.len();
        for cb in batch {
            cb();
        }
        if ran > 0 {
            log::trace!("frame {frame_index}: ran {ran} callback(s)");
        }
        FrameTick { frame_index, ran }
    }

    /// Tick until nothing is pending or `max_frames` frames ran.
    /// Returns the number of frames ticked.
    pub fn run_until_idle(&self, max_frames: u64) -> u64 {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.tick();
            frames += 1;
        }
        frames
    }
}

impl Scheduler for FrameQueue {
    fn next_frame(&self, cb: Box<dyn FnOnce()>) {
        self.pending.borrow_mut().push(cb);
    }
}
