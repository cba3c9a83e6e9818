//! LIFO call/value stack over a typed store.
use crate::error::{ConfigError, StorageError};
use crate::memory::TypedStore;
use crate::width::{BitWidth, Word};

pub const DEFAULT_STACK_CAPACITY: usize = 128;

/// A typed store used in LIFO order.
///
/// `top` is the next free slot: it starts at 0, `push` stores there and
/// advances, `pop` steps back and clears the slot it read.
#[derive(Debug, Clone)]
pub struct Stack<W: Word> {
    store: TypedStore<W>,
    top: usize,
}

impl<W: Word> Stack<W> {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Stack {
            store: TypedStore::new(capacity)?,
            top: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn width(&self) -> BitWidth {
        W::WIDTH
    }

    /// index of the next free slot, which is also the depth
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    /// store `item` (wrapped into the width) and return what was stored
    pub fn push(&mut self, item: impl Into<u64>) -> Result<W, StorageError> {
        if self.top == self.capacity() {
            return Err(StorageError::StackOverflow {
                capacity: self.capacity(),
            });
        }
        let value = W::wrap(item.into());
        self.store.write(self.top, &[value])?;
        self.top += 1;
        Ok(value)
    }

    pub fn pop(&mut self) -> Result<W, StorageError> {
        if self.top == 0 {
            return Err(StorageError::StackUnderflow);
        }
        self.top -= 1;
        let slot = self.store.slice_mut(self.top, 1)?;
        let value = slot[0];
        slot[0] = W::default();
        Ok(value)
    }

    /// Value in the slot at `top`, i.e. the next free slot.
    ///
    /// This is NOT the most recently pushed value (see `last`); the free slot
    /// is always zero unless written through some other path. When the stack
    /// is full the slot does not exist and `OutOfBounds` is returned.
    pub fn peek(&self) -> Result<W, StorageError> {
        Ok(self.store.slice(self.top, 1)?[0])
    }

    /// most recently pushed value
    pub fn last(&self) -> Option<W> {
        match self.top {
            0 => None,
            n => self.store.slice(n - 1, 1).ok().map(|s| s[0]),
        }
    }

    /// copy of every slot, used or not
    pub fn dump(&self) -> Vec<W> {
        self.store.dump()
    }
}

impl<W: Word> Default for Stack<W> {
    fn default() -> Self {
        Stack {
            store: TypedStore::zeroed(DEFAULT_STACK_CAPACITY),
            top: 0,
        }
    }
}
