use crate::error::{ConfigError, StorageError};
use crate::width::{BitWidth, Word};
use std::io;

// NB. addresses and lengths are usize; values handed in are any unsigned
//     integer and get wrapped into the cell width on the way in

/// Addressable array of fixed-width cells, used as machine memory.
///
/// Element size follows `W`, so a `TypedStore<u8>` is a plain byte array and
/// a `TypedStore<u32>` holds 32-bit words. Every address in `0..capacity` is
/// valid; anything beyond is reported as `StorageError::OutOfBounds` rather
/// than wrapped or truncated.
#[derive(Debug, Clone)]
pub struct TypedStore<W: Word> {
    cells: Box<[W]>,
}

impl<W: Word> TypedStore<W> {
    /// a zeroed store of `capacity` cells
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self::zeroed(capacity))
    }

    pub(crate) fn zeroed(capacity: usize) -> Self {
        TypedStore {
            cells: vec![W::default(); capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> BitWidth {
        W::WIDTH
    }

    fn range(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>, StorageError> {
        match start.checked_add(len) {
            Some(end) if end <= self.cells.len() => Ok(start..end),
            _ => Err(StorageError::OutOfBounds {
                start,
                len,
                capacity: self.cells.len(),
            }),
        }
    }

    /// Write `values` starting at `start`, wrapping each into the cell width.
    ///
    /// Returns the address one past the last cell written. Nothing is
    /// written if the run does not fit.
    pub fn write<V: Into<u64> + Copy>(
        &mut self,
        start: usize,
        values: &[V],
    ) -> Result<usize, StorageError> {
        let range = self.range(start, values.len())?;
        for (cell, v) in self.cells[range.clone()].iter_mut().zip(values) {
            *cell = W::wrap((*v).into());
        }
        Ok(range.end)
    }

    /// copy of `count` cells from `start`
    pub fn read(&self, start: usize, count: usize) -> Result<Vec<W>, StorageError> {
        Ok(self.slice(start, count)?.to_vec())
    }

    /// get a r/o slice of the underlying cells
    pub fn slice(&self, start: usize, len: usize) -> Result<&[W], StorageError> {
        let range = self.range(start, len)?;
        Ok(&self.cells[range])
    }

    /// get a r/w slice of the underlying cells
    pub fn slice_mut(&mut self, start: usize, len: usize) -> Result<&mut [W], StorageError> {
        let range = self.range(start, len)?;
        Ok(&mut self.cells[range])
    }

    /// full copy of every cell
    pub fn dump(&self) -> Vec<W> {
        self.cells.to_vec()
    }
}

impl TypedStore<u8> {
    /// Load an image of unknown length (a ROM, say) from `reader` at `start`.
    ///
    /// Returns the address one past the last byte loaded.
    pub fn load(
        &mut self,
        reader: &mut impl io::Read,
        start: usize,
    ) -> Result<usize, StorageError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.write(start, &buf)
    }

    /// get a big-endian two-byte word (opcodes, return addresses)
    pub fn fetch_u16(&self, addr: usize) -> Result<u16, StorageError> {
        let word = self.slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }
}
