//! Fixed-width cell arithmetic.
//!
//! Every value stored in a register, memory cell or stack slot is an unsigned
//! integer of 8, 16 or 32 bits. Writes never fail on range: they wrap modulo
//! 2^bits, the same way the native integer types do.

use crate::error::ConfigError;
use std::fmt;

/// the widths a cell may be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitWidth {
    W8,
    W16,
    W32,
}

impl BitWidth {
    pub fn from_bits(bits: u32) -> Result<Self, ConfigError> {
        match bits {
            8 => Ok(BitWidth::W8),
            16 => Ok(BitWidth::W16),
            32 => Ok(BitWidth::W32),
            _ => Err(ConfigError::UnsupportedWidth(bits)),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            BitWidth::W8 => 8,
            BitWidth::W16 => 16,
            BitWidth::W32 => 32,
        }
    }

    /// largest value a cell of this width can hold
    pub const fn max(self) -> u32 {
        match self {
            BitWidth::W8 => u8::MAX as u32,
            BitWidth::W16 => u16::MAX as u32,
            BitWidth::W32 => u32::MAX,
        }
    }

    /// reduce any value modulo 2^bits
    pub const fn wrap(self, value: u64) -> u32 {
        (value & self.max() as u64) as u32
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Storage element of a typed store or stack.
///
/// Implemented for `u8`, `u16` and `u32` so that the element size of the
/// backing array follows the declared width.
pub trait Word: Copy + Default + PartialEq + fmt::Debug + Into<u64> + 'static {
    const WIDTH: BitWidth;

    /// truncate `value` into this width
    fn wrap(value: u64) -> Self;

    fn wrapping_inc(self, by: u64) -> Self {
        Self::wrap(self.into().wrapping_add(by))
    }

    fn wrapping_dec(self, by: u64) -> Self {
        Self::wrap(self.into().wrapping_sub(by))
    }
}

macro_rules! impl_word {
    ($t:ty, $width:expr) => {
        impl Word for $t {
            const WIDTH: BitWidth = $width;

            fn wrap(value: u64) -> Self {
                value as $t
            }
        }
    };
}

impl_word!(u8, BitWidth::W8);
impl_word!(u16, BitWidth::W16);
impl_word!(u32, BitWidth::W32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits() {
        assert_eq!(BitWidth::from_bits(8), Ok(BitWidth::W8));
        assert_eq!(BitWidth::from_bits(16), Ok(BitWidth::W16));
        assert_eq!(BitWidth::from_bits(32), Ok(BitWidth::W32));
        assert_eq!(
            BitWidth::from_bits(12),
            Err(ConfigError::UnsupportedWidth(12))
        );
    }

    #[test]
    fn test_wrap_reduces_modulo_width() {
        assert_eq!(BitWidth::W8.wrap(257), 1);
        assert_eq!(BitWidth::W16.wrap(0x1_0005), 5);
        assert_eq!(BitWidth::W32.wrap(0x1_0000_0002), 2);
        assert_eq!(BitWidth::W32.wrap(u32::MAX as u64), u32::MAX);
    }

    #[test]
    fn test_word_matches_native_wraparound() {
        assert_eq!(255u8.wrapping_inc(1), 0);
        assert_eq!(0u8.wrapping_dec(1), 255);
        assert_eq!(u16::MAX.wrapping_inc(3), 2);
        assert_eq!(1u16.wrapping_dec(2), u16::MAX);
        assert_eq!(u32::MAX.wrapping_inc(1), 0);
        assert_eq!(0u32.wrapping_dec(1), u32::MAX);
    }

    #[test]
    fn test_word_width() {
        assert_eq!(<u8 as Word>::WIDTH, BitWidth::W8);
        assert_eq!(<u16 as Word>::WIDTH.bits(), 16);
        assert_eq!(<u32 as Word>::WIDTH.max(), u32::MAX);
    }
}
