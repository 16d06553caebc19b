//! Seek arithmetic shared by the composed streams.
//!
//! This module provides:
//! - `Whence`: the three conventional seek modes, parseable from raw values
//! - `SeekWhence`: `seek_whence(offset, whence)` for any `Seek`
//! - `resolve_position`: absolute target of a `SeekFrom` request
//! - `FragmentLayout`: mapping between logical offsets and fragments

use std::io::{self, Seek, SeekFrom};

use crate::error::SeekError;

/// Reference point of a seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Relative to the start of the stream (raw value 0)
    Start,
    /// Relative to the current position (raw value 1)
    Current,
    /// Relative to the end of the stream (raw value 2)
    End,
}

impl Whence {
    /// Parse a raw whence value using the `SEEK_SET`/`SEEK_CUR`/`SEEK_END`
    /// numbering.
    pub fn from_raw(raw: i32) -> Result<Self, SeekError> {
        match raw {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            other => Err(SeekError::InvalidWhence(other)),
        }
    }

    /// Build the `SeekFrom` request for `offset` relative to this whence.
    pub fn seek_from(self, offset: i64) -> Result<SeekFrom, SeekError> {
        match self {
            Whence::Start => u64::try_from(offset)
                .map(SeekFrom::Start)
                .map_err(|_| SeekError::NegativePosition),
            Whence::Current => Ok(SeekFrom::Current(offset)),
            Whence::End => Ok(SeekFrom::End(offset)),
        }
    }
}

/// Seek with a raw `(offset, whence)` pair.
///
/// Unknown whence values fail with `InvalidInput` before the underlying
/// stream is touched.
pub trait SeekWhence: Seek {
    fn seek_whence(&mut self, offset: i64, whence: i32) -> io::Result<u64> {
        let pos = Whence::from_raw(whence).and_then(|w| w.seek_from(offset))?;
        self.seek(pos)
    }
}

impl<S: Seek + ?Sized> SeekWhence for S {}

/// Compute the absolute position a seek request lands on.
pub fn resolve_position(pos: SeekFrom, current: u64, size: u64) -> Result<u64, SeekError> {
    let (base, delta) = match pos {
        SeekFrom::Start(n) => return Ok(n),
        SeekFrom::Current(delta) => (current, delta),
        SeekFrom::End(delta) => (size, delta),
    };
    base.checked_add_signed(delta).ok_or(if delta < 0 {
        SeekError::NegativePosition
    } else {
        SeekError::Overflow
    })
}

/// Byte layout of an ordered list of fragments.
///
/// Fragment `i` occupies the logical range `[start_of(i), end_of(i))`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentLayout {
    ends: Vec<u64>,
}

impl FragmentLayout {
    /// Build a layout from fragment lengths, in order.
    ///
    /// Fails with `InvalidData` when the total length overflows `u64`.
    pub fn from_sizes<I>(sizes: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut total: u64 = 0;
        let mut ends = Vec::new();
        for (index, size) in sizes.into_iter().enumerate() {
            total = total.checked_add(size).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("total size overflows u64 at fragment #{index}"),
                )
            })?;
            ends.push(total);
        }
        Ok(Self { ends })
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Total logical size: the sum of all fragment lengths.
    pub fn total_size(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Logical offset where fragment `index` starts.
    pub fn start_of(&self, index: usize) -> u64 {
        match index {
            0 => 0,
            i => self.ends[i - 1],
        }
    }

    /// Logical offset just past fragment `index`.
    pub fn end_of(&self, index: usize) -> u64 {
        self.ends[index]
    }

    /// Length of fragment `index`.
    pub fn size_of(&self, index: usize) -> u64 {
        self.end_of(index) - self.start_of(index)
    }

    /// Fragment lengths, in order.
    pub fn sizes(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(|i| self.size_of(i))
    }

    /// Map a logical offset to `(fragment index, local offset)`.
    ///
    /// Returns `None` at or beyond the total size. Zero-length fragments own
    /// no offsets and are never returned.
    pub fn locate(&self, offset: u64) -> Option<(usize, u64)> {
        let index = self.ends.partition_point(|&end| end <= offset);
        (index < self.len()).then(|| (index, offset - self.start_of(index)))
    }

    /// First fragment after `index` that holds at least one byte.
    pub fn next_non_empty(&self, index: usize) -> Option<usize> {
        (index + 1..self.len()).find(|&i| self.size_of(i) > 0)
    }
}
