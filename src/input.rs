use crate::error::KeyboardError;
use crate::events::{Emitter, Event, SubscriptionId};
use crate::time::{TimeSource, Timed};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// how long an observed key counts as held without being seen again
pub const DEFAULT_LEASE_INTERVAL: Duration = Duration::from_millis(150);

/// map of keys on the host keyboard to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
pub const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// two-key machines: '0' and '1'
pub const BINARY_KEYMAP: [(char, u8); 2] = [('0', 0x00), ('1', 0x01)];

/// physical key to domain key code
pub type Keymap = HashMap<KeyCode, u8>;

pub fn keymap_from_chars(pairs: &[(char, u8)]) -> Keymap {
    pairs
        .iter()
        .map(|&(c, code)| (KeyCode::Char(c), code))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEventKind {
    KeyPress,
    InvalidKeyPress,
    KeyLease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub kind: KeyboardEventKind,
    /// the character typed, if the key produces one
    pub raw: Option<char>,
    pub key: KeyEvent,
    /// `None` only for `InvalidKeyPress`
    pub code: Option<u8>,
}

impl Event for KeyboardEvent {
    type Kind = KeyboardEventKind;

    fn kind(&self) -> KeyboardEventKind {
        self.kind
    }
}

/// Result of a wait that has not necessarily happened yet.
///
/// The interpreter keeps this around and polls it (once per tick, say) while
/// the clock carries on. Dropping it abandons the wait.
#[derive(Debug)]
pub struct Pending<T> {
    slot: Rc<RefCell<Option<T>>>,
    prompt: String,
}

impl<T> Pending<T> {
    fn new(prompt: &str) -> Self {
        Pending {
            slot: Rc::new(RefCell::new(None)),
            prompt: prompt.to_string(),
        }
    }

    /// take the value if it has arrived
    pub fn poll(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// text to show the user while waiting for a line; empty for key waits
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

// the keyboard's end of a Pending; live while the caller still holds theirs
struct Waiter<T>(Rc<RefCell<Option<T>>>);

impl<T> Waiter<T> {
    fn of(pending: &Pending<T>) -> Self {
        Waiter(pending.slot.clone())
    }

    fn is_live(&self) -> bool {
        Rc::strong_count(&self.0) > 1
    }

    fn resolve(self, value: T) {
        *self.0.borrow_mut() = Some(value);
    }
}

struct Lease {
    deadline: Duration,
    raw: Option<char>,
    key: KeyEvent,
}

/// Translates host key input into machine key codes and tracks which codes
/// are currently held.
///
/// A code stays held for one lease interval after its key was last seen;
/// each sighting restarts that code's own lease. Expiry happens from `poll`,
/// which emits `KeyLease`.
pub struct Keyboard {
    keymap: Keymap,
    lease_interval: Duration,
    time: Rc<dyn TimeSource>,
    leases: HashMap<u8, Lease>,
    key_waiter: Option<Waiter<u8>>,
    line_waiter: Option<Waiter<Vec<u8>>>,
    line: String,
    events: Emitter<KeyboardEvent>,
}

impl Keyboard {
    pub fn new(keymap: Keymap, time: Rc<dyn TimeSource>) -> Self {
        Keyboard {
            keymap,
            lease_interval: DEFAULT_LEASE_INTERVAL,
            time,
            leases: HashMap::new(),
            key_waiter: None,
            line_waiter: None,
            line: String::new(),
            events: Emitter::new(),
        }
    }

    /// 16-key hex keypad on the left-hand side of a qwerty keyboard
    pub fn chip8(time: Rc<dyn TimeSource>) -> Self {
        Self::new(keymap_from_chars(&CHIP8_CONVENTIONAL_KEYMAP), time)
    }

    pub fn binary(time: Rc<dyn TimeSource>) -> Self {
        Self::new(keymap_from_chars(&BINARY_KEYMAP), time)
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn lease_interval(&self) -> Duration {
        self.lease_interval
    }

    /// applies to keys observed from now on
    pub fn set_lease_interval(&mut self, interval: Duration) {
        self.lease_interval = interval;
    }

    pub fn subscribe(
        &mut self,
        kind: KeyboardEventKind,
        handler: impl FnMut(&KeyboardEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// codes currently held
    pub fn pressed_snapshot(&self) -> BTreeSet<u8> {
        self.leases.keys().copied().collect()
    }

    pub fn is_pressed(&self, code: u8) -> bool {
        self.leases.contains_key(&code)
    }

    /// true while someone holds an unresolved `await_next_key`
    pub fn is_waiting(&self) -> bool {
        self.key_waiter.as_ref().map_or(false, Waiter::is_live)
    }

    pub fn observe_char(&mut self, c: char) -> Result<u8, KeyboardError> {
        self.observe(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    /// Feed one key event from the host.
    ///
    /// A mapped key is (re)leased as held, announced with `KeyPress` and
    /// handed to a pending `await_next_key`. An unmapped key changes nothing
    /// and is announced with `InvalidKeyPress`. Either way the key also edits
    /// the line being collected for `await_line`.
    pub fn observe(&mut self, key: KeyEvent) -> Result<u8, KeyboardError> {
        let raw = match key.code {
            KeyCode::Char(c) => Some(c),
            _ => None,
        };
        self.collect_line(key.code);

        let code = match self.keymap.get(&key.code) {
            Some(&code) => code,
            None => {
                warn!("can't map {:?} to a machine key", key.code);
                self.events.emit(&KeyboardEvent {
                    kind: KeyboardEventKind::InvalidKeyPress,
                    raw,
                    key,
                    code: None,
                });
                return Err(KeyboardError::UnmappedKey(key.code));
            }
        };

        let deadline = self.time.now() + self.lease_interval;
        self.leases.insert(code, Lease { deadline, raw, key });
        self.events.emit(&KeyboardEvent {
            kind: KeyboardEventKind::KeyPress,
            raw,
            key,
            code: Some(code),
        });
        if let Some(waiter) = self.key_waiter.take() {
            if waiter.is_live() {
                waiter.resolve(code);
            }
        }
        Ok(code)
    }

    fn collect_line(&mut self, code: KeyCode) {
        if !self.line_waiter.as_ref().map_or(false, Waiter::is_live) {
            self.line.clear();
            return;
        }
        match code {
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.line);
                self.submit_line(&line);
            }
            KeyCode::Backspace => {
                self.line.pop();
            }
            KeyCode::Char(c) => self.line.push(c),
            _ => {}
        }
    }

    /// resolves with the code of the next mapped key observed
    pub fn await_next_key(&mut self) -> Result<Pending<u8>, KeyboardError> {
        if self.is_waiting() {
            return Err(KeyboardError::AlreadyAwaiting);
        }
        let pending = Pending::new("");
        self.key_waiter = Some(Waiter::of(&pending));
        Ok(pending)
    }

    /// Resolves once a line has been entered (keys observed up to Enter, or
    /// a `submit_line`), with the codes of its mapped characters in order.
    /// Characters without a keymap entry are dropped.
    pub fn await_line(&mut self, prompt: &str) -> Result<Pending<Vec<u8>>, KeyboardError> {
        if self.line_waiter.as_ref().map_or(false, Waiter::is_live) {
            return Err(KeyboardError::AlreadyAwaiting);
        }
        self.line.clear();
        let pending = Pending::new(prompt);
        self.line_waiter = Some(Waiter::of(&pending));
        Ok(pending)
    }

    /// Hand a complete line to a pending `await_line`.
    ///
    /// Returns false if nobody was waiting for one.
    pub fn submit_line(&mut self, line: &str) -> bool {
        match self.line_waiter.take() {
            Some(waiter) if waiter.is_live() => {
                let codes = line
                    .chars()
                    .filter_map(|c| self.keymap.get(&KeyCode::Char(c)).copied())
                    .collect();
                waiter.resolve(codes);
                self.line.clear();
                true
            }
            _ => false,
        }
    }
}

impl Timed for Keyboard {
    fn next_deadline(&self) -> Option<Duration> {
        self.leases.values().map(|l| l.deadline).min()
    }

    /// release every code whose lease has run out, earliest first
    fn poll(&mut self) {
        let now = self.time.now();
        let mut expired: Vec<(Duration, u8)> = self
            .leases
            .iter()
            .filter(|(_, l)| l.deadline <= now)
            .map(|(&code, l)| (l.deadline, code))
            .collect();
        expired.sort_unstable();
        for (_, code) in expired {
            if let Some(lease) = self.leases.remove(&code) {
                debug!("key {:#x} released", code);
                self.events.emit(&KeyboardEvent {
                    kind: KeyboardEventKind::KeyLease,
                    raw: lease.raw,
                    key: lease.key,
                    code: Some(code),
                });
            }
        }
    }
}

impl fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyboard")
            .field("keys", &self.keymap.len())
            .field("lease_interval", &self.lease_interval)
            .field("pressed", &self.pressed_snapshot())
            .field("waiting", &self.is_waiting())
            .finish()
    }
}
