//! Machine parameters in one place.
use crate::clock::Clock;
use crate::error::ConfigError;
use crate::input::{Keyboard, Keymap, DEFAULT_LEASE_INTERVAL};
use crate::memory::TypedStore;
use crate::stack::Stack;
use crate::time::TimeSource;
use crate::width::{BitWidth, Word};
use std::rc::Rc;
use std::time::Duration;

/// Everything needed to set up the substrate for one machine.
///
/// The default describes a 4K CHIP-8: 60 Hz, byte memory, sixteen 16-bit
/// return addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub frequency_hz: u32,
    pub memory_width: BitWidth,
    pub memory_capacity: usize,
    pub stack_width: BitWidth,
    pub stack_capacity: usize,
    pub lease_interval: Duration,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            frequency_hz: 60,
            memory_width: BitWidth::W8,
            memory_capacity: 4096,
            stack_width: BitWidth::W16,
            stack_capacity: 16,
            lease_interval: DEFAULT_LEASE_INTERVAL,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.memory_capacity == 0 || self.stack_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    fn check_width<W: Word>(configured: BitWidth) -> Result<(), ConfigError> {
        if W::WIDTH == configured {
            Ok(())
        } else {
            Err(ConfigError::WidthMismatch {
                configured: configured.bits(),
                requested: W::WIDTH.bits(),
            })
        }
    }

    /// memory with `W` matching `memory_width`
    pub fn memory<W: Word>(&self) -> Result<TypedStore<W>, ConfigError> {
        Self::check_width::<W>(self.memory_width)?;
        TypedStore::new(self.memory_capacity)
    }

    /// stack with `W` matching `stack_width`
    pub fn stack<W: Word>(&self) -> Result<Stack<W>, ConfigError> {
        Self::check_width::<W>(self.stack_width)?;
        Stack::new(self.stack_capacity)
    }

    pub fn clock(&self, time: Rc<dyn TimeSource>) -> Result<Clock, ConfigError> {
        Clock::new(self.frequency_hz, time)
    }

    pub fn keyboard(&self, keymap: Keymap, time: Rc<dyn TimeSource>) -> Keyboard {
        let mut kb = Keyboard::new(keymap, time);
        kb.set_lease_interval(self.lease_interval);
        kb
    }
}
