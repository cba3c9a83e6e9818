use crossterm::event::KeyCode;
use std::io;
use thiserror::Error;

/// caller precondition violations on memory and stacks
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("access of {len} cell(s) at {start:#06x} exceeds capacity {capacity}")]
    OutOfBounds {
        start: usize,
        len: usize,
        capacity: usize,
    },
    #[error("stack overflow: all {capacity} slots in use")]
    StackOverflow { capacity: usize },
    #[error("stack underflow: pop from an empty stack")]
    StackUnderflow,
    #[error("failed to load image: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("unknown register: {0}")]
    UnknownRegister(String),
    #[error("register already exists: {0}")]
    DuplicateRegister(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyboardError {
    #[error("key {0:?} has no entry in the keymap")]
    UnmappedKey(KeyCode),
    #[error("another caller is already awaiting input")]
    AlreadyAwaiting,
}

/// rejected construction parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("clock frequency must be greater than zero")]
    ZeroFrequency,
    #[error("storage capacity must be greater than zero")]
    ZeroCapacity,
    #[error("unsupported bit width: {0} (expected 8, 16 or 32)")]
    UnsupportedWidth(u32),
    #[error("configured for {configured}-bit cells, requested {requested}-bit")]
    WidthMismatch { configured: u32, requested: u32 },
}
