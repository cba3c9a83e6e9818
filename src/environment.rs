//! The host loop.
//!
//! Polls every timer-owning component, then sleeps until the earliest pending
//! deadline among them. Callbacks therefore run one at a time on the calling
//! thread, in deadline order within each component.

use crate::time::{TimeSource, Timed};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EventLoop {
    time: Rc<dyn TimeSource>,
}

impl EventLoop {
    pub fn new(time: Rc<dyn TimeSource>) -> Self {
        EventLoop { time }
    }

    pub fn now(&self) -> Duration {
        self.time.now()
    }

    /// earliest deadline pending on any task
    pub fn next_deadline(tasks: &[&mut dyn Timed]) -> Option<Duration> {
        tasks.iter().filter_map(|t| t.next_deadline()).min()
    }

    fn poll_all(tasks: &mut [&mut dyn Timed]) {
        for task in tasks.iter_mut() {
            task.poll();
        }
    }

    /// Run until the time source reaches `until`.
    ///
    /// Everything due at or before `until` has fired when this returns.
    pub fn run_until(&self, tasks: &mut [&mut dyn Timed], until: Duration) {
        loop {
            Self::poll_all(tasks);
            if self.time.now() >= until {
                return;
            }
            let wake = Self::next_deadline(tasks).map_or(until, |d| d.min(until));
            self.time.sleep_until(wake);
        }
    }

    pub fn run_for(&self, tasks: &mut [&mut dyn Timed], duration: Duration) {
        let until = self.time.now() + duration;
        self.run_until(tasks, until);
    }

    /// Run while `keep_going` holds, checking it after every round of polls.
    ///
    /// Also returns once nothing is scheduled, since nothing would ever wake
    /// the loop again.
    pub fn run_while(&self, tasks: &mut [&mut dyn Timed], mut keep_going: impl FnMut() -> bool) {
        loop {
            Self::poll_all(tasks);
            if !keep_going() {
                return;
            }
            match Self::next_deadline(tasks) {
                Some(deadline) => self.time.sleep_until(deadline),
                None => return,
            }
        }
    }
}
