//! Strict FIFO job queue with a single runner.
//!
//! A [`Job`] receives a [`Done`] token when it starts. Nothing else in the
//! queue moves until that token is completed, which is what keeps effects on
//! one element from overlapping.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Run = Box<dyn FnOnce(Done)>;
type Finish = Box<dyn FnOnce()>;

/// One unit of asynchronous visual work.
pub struct Job {
    label: String,
    run: Run,
    finish: Option<Finish>,
}

impl Job {
    pub fn new(run: impl FnOnce(Done) + 'static) -> Self {
        Self { label: String::new(), run: Box::new(run), finish: None }
    }

    /// Called once the job completes, before the next job starts.
    pub fn on_finish(mut self, finish: impl FnOnce() + 'static) -> Self {
        self.finish = Some(Box::new(finish));
        self
    }

    /// Name shown in log output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("label", &self.label).finish_non_exhaustive()
    }
}

// ── Completion token ──────────────────────────────────────────────────────

/// Move-only completion handle passed to a running job.
///
/// `complete` consumes the token, so a job cannot complete twice.
#[must_use = "a job that never completes stalls its queue"]
pub struct Done {
    ticket: u64,
    label: String,
    queue: Weak<RefCell<QueueState>>,
    completed: bool,
}

impl Done {
    pub fn complete(mut self) {
        self.completed = true;
        if let Some(state) = self.queue.upgrade() {
            JobQueue { state }.complete(self.ticket);
        }
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        if !self.completed && self.queue.strong_count() > 0 {
            log::warn!("job {:?} dropped its completion token; queue stalled", self.label);
        }
    }
}

// ── Queue ─────────────────────────────────────────────────────────────────

struct Running {
    ticket: u64,
    finish: Option<Finish>,
}

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    running: Option<Running>,
    next_ticket: u64,
}

/// Per-element serializer. Clones share the same queue.
#[derive(Clone, Default)]
pub struct JobQueue {
    state: Rc<RefCell<QueueState>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `job` and start it if nothing is running.
    pub fn enqueue(&self, job: Job) {
        log::trace!("enqueue job {:?}", job.label);
        self.state.borrow_mut().jobs.push_back(job);
        self.pump();
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running.is_some()
    }

    /// Jobs waiting behind the running one.
    pub fn len(&self) -> usize {
        self.state.borrow().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the head job if the queue is idle.
    fn pump(&self) {
        let (job, ticket) = {
            let mut s = self.state.borrow_mut();
            if s.running.is_some() {
                return;
            }
            let Some(mut job) = s.jobs.pop_front() else { return };
            s.next_ticket += 1;
            let ticket = s.next_ticket;
            s.running = Some(Running { ticket, finish: job.finish.take() });
            (job, ticket)
        };

        log::trace!("start job {:?}", job.label);
        let done = Done { ticket, label: job.label, queue: Rc::downgrade(&self.state), completed: false };
        (job.run)(done);
    }

    fn complete(&self, ticket: u64) {
        let finish = {
            let mut s = self.state.borrow_mut();
            match s.running.as_mut() {
                Some(r) if r.ticket == ticket => r.finish.take(),
                _ => return,
            }
        };

        if let Some(finish) = finish {
            finish();
        }
        self.state.borrow_mut().running = None;
        self.pump();
    }
}
