//! # registers
//!
//! A `Register` is a single fixed-width cell. A `RegisterBank` holds the named
//! general-purpose registers of a CPU (V0..VF, I, DT, ...) and dispatches
//! operations to them by name.
use crate::error::RegisterError;
use crate::width::BitWidth;
use log::debug;
use std::collections::HashMap;

/// A scalar cell; every write wraps into the declared width.
///
/// Unlike `TypedStore<W>` the width is a runtime value: one bank holds
/// 8-bit data registers next to a 16-bit index register, so its cells
/// must share a type. Wrapping goes through `BitWidth::wrap` and agrees
/// with `Word` for the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    width: BitWidth,
    value: u32,
}

impl Register {
    pub fn new(width: BitWidth) -> Self {
        Register { width, value: 0 }
    }

    pub fn width(&self) -> BitWidth {
        self.width
    }

    pub fn get(&self) -> u32 {
        self.value
    }

    /// store `value` modulo 2^width, returning what was stored
    pub fn set(&mut self, value: u64) -> u32 {
        self.value = self.width.wrap(value);
        self.value
    }

    pub fn inc(&mut self, by: u64) -> u32 {
        self.set((self.value as u64).wrapping_add(by))
    }

    pub fn dec(&mut self, by: u64) -> u32 {
        self.set((self.value as u64).wrapping_sub(by))
    }

    /// non-zero becomes 0, zero becomes 1
    pub fn toggle(&mut self) -> u32 {
        self.value = if self.value > 0 { 0 } else { 1 };
        self.value
    }
}

/// name-indexed set of registers
#[derive(Debug, Default)]
pub struct RegisterBank {
    registers: HashMap<String, Register>,
}

impl RegisterBank {
    pub fn new() -> Self {
        RegisterBank {
            registers: HashMap::new(),
        }
    }

    /// create a zeroed register called `name`
    pub fn create(&mut self, name: &str, width: BitWidth) -> Result<(), RegisterError> {
        self.attach(name, Register::new(width))
    }

    /// register an existing cell under `name`, keeping its current value
    pub fn attach(&mut self, name: &str, register: Register) -> Result<(), RegisterError> {
        if self.registers.contains_key(name) {
            return Err(RegisterError::DuplicateRegister(name.to_string()));
        }
        debug!("register {} created ({})", name, register.width());
        self.registers.insert(name.to_string(), register);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// register names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn register(&self, name: &str) -> Result<&Register, RegisterError> {
        self.registers
            .get(name)
            .ok_or_else(|| RegisterError::UnknownRegister(name.to_string()))
    }

    fn register_mut(&mut self, name: &str) -> Result<&mut Register, RegisterError> {
        self.registers
            .get_mut(name)
            .ok_or_else(|| RegisterError::UnknownRegister(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<u32, RegisterError> {
        Ok(self.register(name)?.get())
    }

    pub fn set(&mut self, name: &str, value: u64) -> Result<u32, RegisterError> {
        Ok(self.register_mut(name)?.set(value))
    }

    pub fn inc(&mut self, name: &str, by: u64) -> Result<u32, RegisterError> {
        Ok(self.register_mut(name)?.inc(by))
    }

    pub fn dec(&mut self, name: &str, by: u64) -> Result<u32, RegisterError> {
        Ok(self.register_mut(name)?.dec(by))
    }

    pub fn toggle(&mut self, name: &str) -> Result<u32, RegisterError> {
        Ok(self.register_mut(name)?.toggle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::Word;

    const WIDTHS: [BitWidth; 3] = [BitWidth::W8, BitWidth::W16, BitWidth::W32];

    #[test]
    fn test_register_starts_at_zero() {
        for w in WIDTHS {
            assert_eq!(Register::new(w).get(), 0);
        }
    }

    #[test]
    fn test_set_wraps() {
        let mut r = Register::new(BitWidth::W8);
        assert_eq!(r.set(257), 1);
        let mut r = Register::new(BitWidth::W16);
        assert_eq!(r.set(0x1_2345), 0x2345);
    }

    #[test]
    fn test_inc_wraps_upward() {
        for w in WIDTHS {
            let mut r = Register::new(w);
            r.set(w.max() as u64);
            assert_eq!(r.inc(1), 0);
            r.set(w.max() as u64 - 1);
            assert_eq!(r.inc(5), 3);
        }
    }

    #[test]
    fn test_dec_wraps_downward() {
        for w in WIDTHS {
            let mut r = Register::new(w);
            assert_eq!(r.dec(1), w.max());
            r.set(2);
            assert_eq!(r.dec(4), w.max() - 1);
        }
    }

    #[test]
    fn test_inc_dec_stay_in_range() {
        for w in WIDTHS {
            let mut r = Register::new(w);
            for step in [1u64, 7, 255, 256, 65_535, 1 << 33] {
                assert!(r.inc(step) <= w.max());
                assert!(r.dec(step * 3) <= w.max());
            }
        }
    }

    #[test]
    fn test_toggle() {
        let mut r = Register::new(BitWidth::W8);
        assert_eq!(r.toggle(), 1);
        assert_eq!(r.toggle(), 0);
        r.set(0x80);
        assert_eq!(r.toggle(), 0);
    }

    fn agrees_with_word<W: Word>() {
        let mut r = Register::new(W::WIDTH);
        let mut w = W::default();
        for step in [1u64, 0x7f, 0x1_0001, u64::MAX] {
            w = w.wrapping_inc(step);
            let stored: u64 = w.into();
            assert_eq!(r.inc(step) as u64, stored);
            let back = step.wrapping_mul(3);
            w = w.wrapping_dec(back);
            let stored: u64 = w.into();
            assert_eq!(r.dec(back) as u64, stored);
        }
    }

    #[test]
    fn test_register_agrees_with_word() {
        agrees_with_word::<u8>();
        agrees_with_word::<u16>();
        agrees_with_word::<u32>();
    }

    #[test]
    fn test_bank_dispatches_by_name() -> Result<(), RegisterError> {
        let mut bank = RegisterBank::new();
        bank.create("v0", BitWidth::W8)?;
        bank.create("i", BitWidth::W16)?;
        assert_eq!(bank.set("v0", 0x1ff)?, 0xff);
        assert_eq!(bank.inc("v0", 1)?, 0);
        assert_eq!(bank.dec("i", 1)?, 0xffff);
        assert_eq!(bank.toggle("v0")?, 1);
        assert_eq!(bank.get("i")?, 0xffff);
        assert_eq!(bank.names(), vec!["i", "v0"]);
        Ok(())
    }

    #[test]
    fn test_unknown_register_is_an_error() {
        let mut bank = RegisterBank::new();
        let missing = Err(RegisterError::UnknownRegister("vf".to_string()));
        assert_eq!(bank.get("vf"), missing);
        assert_eq!(bank.set("vf", 1), missing);
        assert_eq!(bank.inc("vf", 1), missing);
        assert_eq!(bank.dec("vf", 1), missing);
        assert_eq!(bank.toggle("vf"), missing);
    }

    #[test]
    fn test_names_are_unique() {
        let mut bank = RegisterBank::new();
        bank.create("pc", BitWidth::W16).unwrap();
        assert_eq!(
            bank.create("pc", BitWidth::W8),
            Err(RegisterError::DuplicateRegister("pc".to_string()))
        );
        assert_eq!(bank.register("pc").unwrap().width(), BitWidth::W16);
    }

    #[test]
    fn test_attach_keeps_value() -> Result<(), RegisterError> {
        let mut r = Register::new(BitWidth::W32);
        r.set(0xdead_beef);
        let mut bank = RegisterBank::new();
        bank.attach("acc", r)?;
        assert_eq!(bank.get("acc")?, 0xdead_beef);
        assert_eq!(bank.len(), 1);
        Ok(())
    }
}
