//! # clock
//!
//! Drives an interpreter at a fixed frequency. The clock emits one `Tick` per
//! interval while running and announces every state change:
//!
//! ```text
//!             start()               pause()
//!  Stopped ------------> Running ------------> Paused
//!     ^  <------------      ^   <------------    |
//!     |      stop()         |      resume()      |
//!     |                     `--------------------'
//!     `---------------------------- start() (fresh cycle)
//! ```
//!
//! `stop` ends a cycle: the next `start` resets `ticks_in_cycle`. `pause`
//! freezes both counters and `resume` carries on from exactly where it left
//! off. `ticks_total` only ever grows.
use crate::error::ConfigError;
use crate::events::{Emitter, Event, SubscriptionId};
use crate::time::{TimeSource, Timed};
use log::{debug, trace};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockEventKind {
    Start,
    Tick,
    Pause,
    Resume,
    Stop,
}

/// a lifecycle notification with the counters at the moment of emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEvent {
    pub kind: ClockEventKind,
    pub ticks_in_cycle: u64,
    pub ticks_total: u64,
}

impl Event for ClockEvent {
    type Kind = ClockEventKind;

    fn kind(&self) -> ClockEventKind {
        self.kind
    }
}

/// a transition asked for from inside a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRequest {
    Pause,
    Stop,
}

/// Handle for halting a clock from one of its own handlers.
///
/// Handlers run while the clock is borrowed, so they cannot call `pause` or
/// `stop` directly. A request made through the handle is carried out by
/// `poll` right after the handler returns, before the next due tick. A later
/// request replaces an earlier one that has not been carried out yet.
#[derive(Debug, Clone, Default)]
pub struct ClockControl(Rc<Cell<Option<ClockRequest>>>);

impl ClockControl {
    pub fn pause(&self) {
        self.0.set(Some(ClockRequest::Pause));
    }

    pub fn stop(&self) {
        self.0.set(Some(ClockRequest::Stop));
    }

    /// the request waiting to be carried out, if any
    pub fn requested(&self) -> Option<ClockRequest> {
        self.0.get()
    }

    fn take(&self) -> Option<ClockRequest> {
        self.0.take()
    }

    fn clear(&self) {
        self.0.set(None);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counters {
    in_cycle: u64,
    total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stopped,
    Running { next_tick: Duration },
    Paused { saved: Counters },
}

pub struct Clock {
    frequency_hz: u32,
    tick_interval: Duration,
    time: Rc<dyn TimeSource>,
    state: State,
    counters: Counters,
    // deferred start armed by restart()/delayed_start(); only set while not running
    pending_start: Option<Duration>,
    control: ClockControl,
    events: Emitter<ClockEvent>,
}

impl Clock {
    /// a stopped clock ticking `frequency_hz` times per second once started
    pub fn new(frequency_hz: u32, time: Rc<dyn TimeSource>) -> Result<Self, ConfigError> {
        if frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        let tick_interval = (Duration::from_secs(1) / frequency_hz).max(Duration::from_nanos(1));
        Ok(Clock {
            frequency_hz,
            tick_interval,
            time,
            state: State::Stopped,
            counters: Counters::default(),
            pending_start: None,
            control: ClockControl::default(),
            events: Emitter::new(),
        })
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, State::Paused { .. })
    }

    /// ticks across every cycle
    pub fn ticks(&self) -> u64 {
        self.counters.total
    }

    /// ticks since the last `start`
    pub fn ticks_in_cycle(&self) -> u64 {
        self.counters.in_cycle
    }

    /// emulated time across every cycle (ticks x interval)
    pub fn time_passed(&self) -> Duration {
        self.ticks_to_duration(self.counters.total)
    }

    /// emulated time in the current (or last) cycle
    pub fn time_passed_in_cycle(&self) -> Duration {
        self.ticks_to_duration(self.counters.in_cycle)
    }

    fn ticks_to_duration(&self, ticks: u64) -> Duration {
        let nanos = self.tick_interval.as_nanos().saturating_mul(ticks as u128);
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    pub fn subscribe(
        &mut self,
        kind: ClockEventKind,
        handler: impl FnMut(&ClockEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// a handle handlers can use to pause or stop this clock
    pub fn control(&self) -> ClockControl {
        self.control.clone()
    }

    fn apply_request(&mut self) {
        match self.control.take() {
            Some(ClockRequest::Pause) => {
                debug!("clock: pause requested by handler");
                self.pause();
            }
            Some(ClockRequest::Stop) => {
                debug!("clock: stop requested by handler");
                self.stop();
            }
            None => {}
        }
    }

    fn emit(&mut self, kind: ClockEventKind) {
        let event = ClockEvent {
            kind,
            ticks_in_cycle: self.counters.in_cycle,
            ticks_total: self.counters.total,
        };
        self.events.emit(&event);
    }

    /// Begin a new cycle.
    ///
    /// Fails if already running. Otherwise resets `ticks_in_cycle`, emits
    /// `Start` and schedules the first tick one interval from now. Starting
    /// while paused discards the pause snapshot; any deferred start is
    /// superseded.
    pub fn start(&mut self) -> bool {
        let now = self.time.now();
        self.start_at(now)
    }

    fn start_at(&mut self, anchor: Duration) -> bool {
        if self.is_running() {
            debug!("clock: start refused, already running");
            return false;
        }
        self.pending_start = None;
        self.control.clear();
        self.counters.in_cycle = 0;
        self.state = State::Running {
            next_tick: anchor + self.tick_interval,
        };
        debug!(
            "clock: start at {} Hz (total ticks {})",
            self.frequency_hz, self.counters.total
        );
        self.emit(ClockEventKind::Start);
        true
    }

    /// freeze both counters until `resume`
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            debug!("clock: pause refused, not running");
            return false;
        }
        self.state = State::Paused {
            saved: self.counters,
        };
        debug!(
            "clock: pause at {}/{}",
            self.counters.in_cycle, self.counters.total
        );
        self.emit(ClockEventKind::Pause);
        true
    }

    /// Continue after `pause` with the counters saved at that moment.
    ///
    /// `ticks_in_cycle` is not reset; the next tick is one interval from now.
    /// A deferred start armed while paused is dropped.
    pub fn resume(&mut self) -> bool {
        let saved = match self.state {
            State::Paused { saved } => saved,
            _ => {
                debug!("clock: resume refused, not paused");
                return false;
            }
        };
        self.pending_start = None;
        self.control.clear();
        self.counters = saved;
        self.state = State::Running {
            next_tick: self.time.now() + self.tick_interval,
        };
        debug!("clock: resume at {}/{}", saved.in_cycle, saved.total);
        self.emit(ClockEventKind::Resume);
        true
    }

    /// end the current cycle; counters are left as they are
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            debug!("clock: stop refused, not running");
            return false;
        }
        self.state = State::Stopped;
        debug!(
            "clock: stop at {}/{}",
            self.counters.in_cycle, self.counters.total
        );
        self.emit(ClockEventKind::Stop);
        true
    }

    /// Stop now and start again after `pause_interval`.
    ///
    /// Fails if not running. With a zero interval the new cycle starts before
    /// this returns; otherwise the start fires from `poll` once due, and its
    /// own outcome is not reported here.
    pub fn restart(&mut self, pause_interval: Duration) -> bool {
        if !self.is_running() {
            debug!("clock: restart refused, not running");
            return false;
        }
        self.stop();
        self.delayed_start(pause_interval)
    }

    /// start after `delay` (immediately if zero); fails if running
    pub fn delayed_start(&mut self, delay: Duration) -> bool {
        if self.is_running() {
            debug!("clock: delayed start refused, already running");
            return false;
        }
        if delay.is_zero() {
            self.start();
        } else {
            let at = self.time.now() + delay;
            debug!("clock: start deferred by {:?}", delay);
            self.pending_start = Some(at);
        }
        true
    }

    pub fn has_pending_start(&self) -> bool {
        self.pending_start.is_some()
    }

    /// drop a deferred start that has not fired yet
    pub fn cancel_pending_start(&mut self) -> bool {
        self.pending_start.take().is_some()
    }

    fn tick(&mut self, due: Duration) {
        self.counters.in_cycle += 1;
        self.counters.total += 1;
        self.state = State::Running {
            next_tick: due + self.tick_interval,
        };
        trace!(
            "clock: tick {}/{}",
            self.counters.in_cycle,
            self.counters.total
        );
        self.emit(ClockEventKind::Tick);
    }
}

impl Timed for Clock {
    fn next_deadline(&self) -> Option<Duration> {
        match self.state {
            State::Running { next_tick } => Some(next_tick),
            _ => self.pending_start,
        }
    }

    /// Fire every due tick (and a due deferred start) in order.
    ///
    /// A request left on the `ClockControl` handle is carried out before
    /// anything else fires.
    fn poll(&mut self) {
        let now = self.time.now();
        self.apply_request();
        while let Some(due) = self.next_deadline().filter(|d| *d <= now) {
            if self.is_running() {
                self.tick(due);
            } else {
                self.pending_start = None;
                if !self.start_at(due) {
                    debug!("clock: deferred start failed");
                }
            }
            self.apply_request();
        }
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("frequency_hz", &self.frequency_hz)
            .field("state", &self.state)
            .field("ticks_in_cycle", &self.counters.in_cycle)
            .field("ticks_total", &self.counters.total)
            .field("pending_start", &self.pending_start)
            .field("requested", &self.control.requested())
            .finish()
    }
}
