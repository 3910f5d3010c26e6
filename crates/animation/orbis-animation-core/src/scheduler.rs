//! Single-threaded deferred task queue.
//!
//! Work posted here runs on the next scheduling turn, after the current call
//! stack has unwound. The host (or [`CameraAnimations::tick`](crate::CameraAnimations::tick))
//! drains it once per turn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Cloneable handle to a FIFO of deferred tasks.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks queued before this call. Tasks they post wait for the
    /// next turn. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        let n = batch.len();
        for task in batch {
            task();
        }
        n
    }

    /// Run turns until the queue stays empty. Returns the total task count.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let n = self.run_pending();
            if n == 0 {
                return total;
            }
            total += n;
        }
    }
}
