use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

/// Cancellation handle for a scheduled task.
///
/// Dropping the handle leaves the task scheduled; only `cancel` stops it.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

pub trait Scheduler {
    /// Runs `task` once, no earlier than `delay_ms` from now.
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>);

    fn schedule<F>(&self, delay_ms: u32, task: F) -> TaskHandle
    where
        F: FnOnce() + 'static,
        Self: Sized,
    {
        let handle = TaskHandle::default();
        let cancelled = handle.cancelled.clone();
        self.defer(
            delay_ms,
            Box::new(move || {
                if !cancelled.get() {
                    task();
                }
            }),
        );
        handle
    }
}

/// `setTimeout`-backed scheduler. Timeouts are forgotten so they outlive the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, task).forget();
    }
}

#[cfg(test)]
pub mod manual {
    use std::cell::{Cell, RefCell};

    use super::Scheduler;

    struct Pending {
        due: u64,
        seq: u64,
        task: Box<dyn FnOnce()>,
    }

    /// Virtual-clock scheduler; tasks only run inside `advance`.
    #[derive(Default)]
    pub struct ManualScheduler {
        now: Cell<u64>,
        seq: Cell<u64>,
        queue: RefCell<Vec<Pending>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> u64 {
            self.now.get()
        }

        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        /// Moves the clock forward, running due tasks in (due time, FIFO) order.
        /// Tasks scheduled by running tasks are honoured within the same window.
        pub fn advance(&self, ms: u64) {
            let target = self.now.get() + ms;
            loop {
                let next = {
                    let mut queue = self.queue.borrow_mut();
                    let idx = queue
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.due <= target)
                        .min_by_key(|(_, p)| (p.due, p.seq))
                        .map(|(i, _)| i);
                    idx.map(|i| queue.remove(i))
                };
                match next {
                    Some(pending) => {
                        self.now.set(pending.due);
                        (pending.task)();
                    }
                    None => break,
                }
            }
            self.now.set(target);
        }

        pub fn run_all(&self) {
            loop {
                let last_due = self.queue.borrow().iter().map(|p| p.due).max();
                match last_due {
                    Some(due) => self.advance(due.saturating_sub(self.now.get())),
                    None => break,
                }
            }
        }
    }

    impl Scheduler for ManualScheduler {
        fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
            let seq = self.seq.get();
            self.seq.set(seq + 1);
            self.queue.borrow_mut().push(Pending {
                due: self.now.get() + u64::from(delay_ms),
                seq,
                task,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::manual::ManualScheduler;
    use super::*;

    #[test]
    fn tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(300, "hide"), (50, "settle"), (50, "settle-2")] {
            let log = log.clone();
            scheduler.schedule(delay, move || log.borrow_mut().push(name));
        }

        scheduler.advance(49);
        assert!(log.borrow().is_empty());
        scheduler.advance(1);
        assert_eq!(*log.borrow(), vec!["settle", "settle-2"]);
        scheduler.advance(250);
        assert_eq!(*log.borrow(), vec!["settle", "settle-2", "hide"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let handle = {
            let ran = ran.clone();
            scheduler.schedule(10, move || ran.set(true))
        };
        handle.cancel();
        scheduler.advance(100);
        assert!(!ran.get());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn nested_schedules_run_within_window() {
        let scheduler = Rc::new(ManualScheduler::new());
        let ran = Rc::new(Cell::new(0u64));
        {
            let inner = scheduler.clone();
            let ran = ran.clone();
            scheduler.schedule(100, move || {
                let now = inner.now();
                inner.schedule(100, move || ran.set(now + 100));
            });
        }
        scheduler.advance(250);
        assert_eq!(ran.get(), 200);
    }
}
