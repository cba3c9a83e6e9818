//! ## Design
//!
//! * substrate for register-based, cycle-driven virtual machines (CHIP-8 and
//!   friends); no instruction set lives here
//! * storage is fixed width: cell values wrap like native integers, but
//!   addresses never do -- an access past the end is an error
//! * one generic store over u8/u16/u32 rather than a type per width
//! * the clock emits events; the interpreter subscribes to `Tick` and runs an
//!   instruction (or a few) per tick
//! * no threads and no OS timers: components remember deadlines and fire them
//!   when polled, so the same code runs on the wall clock or virtual time
//!
//! Model
//!
//! Environment (EventLoop)
//!  |-- time source: WallTime (spin_sleep) or ManualTime (tests)
//!  |-- Clock(frequency)          -- start/tick/pause/resume/stop events
//!  |-- Keyboard(keymap)          -- keypress/invalidkeypress/keylease events,
//!  |                                held keys, key and line waits
//!  `-- main loop
//!       |-- poll every component; due callbacks fire in deadline order
//!       `-- sleep until the earliest pending deadline
//!
//! Interpreter (not in this crate)
//!  |-- TypedStore<u8>            -- memory
//!  |-- RegisterBank              -- V0..VF, I, timers
//!  |-- Stack<u16>                -- return addresses
//!  `-- on Tick: fetch/decode/execute; on FX0A poll a Pending<u8>
pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod input;
pub mod memory;
pub mod register;
pub mod stack;
pub mod time;
pub mod width;

pub use clock::{Clock, ClockControl, ClockEvent, ClockEventKind, ClockRequest};
pub use config::MachineConfig;
pub use environment::EventLoop;
pub use error::{ConfigError, KeyboardError, RegisterError, StorageError};
pub use events::{Emitter, Event, SubscriptionId};
pub use input::{Keyboard, KeyboardEvent, KeyboardEventKind, Keymap, Pending};
pub use memory::TypedStore;
pub use register::{Register, RegisterBank};
pub use stack::Stack;
pub use time::{ManualTime, TimeSource, Timed, WallTime};
pub use width::{BitWidth, Word};
