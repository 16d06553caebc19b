//! Closable fragment sources.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::ops::Range;

use crate::seek::resolve_position;

/// A seekable byte source with an explicit, fallible close.
///
/// Implementors release their underlying resource in `close`. Reading or
/// seeking after a successful close is implementation-defined.
pub trait ReadSeekClose: Read + Seek + Send {
    fn close(&mut self) -> io::Result<()>;
}

impl<S: ReadSeekClose + ?Sized> ReadSeekClose for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Files are released when dropped; there is nothing to flush on close.
impl ReadSeekClose for File {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]> + Send> ReadSeekClose for Cursor<T> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any `Read + Seek` into a `ReadSeekClose` whose close does nothing.
#[derive(Debug, Clone, Default)]
pub struct NopClose<R> {
    inner: R,
}

impl<R> NopClose<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for NopClose<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for NopClose<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl<R: Read + Seek + Send> ReadSeekClose for NopClose<R> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A window onto the byte range `[start, end)` of an inner source.
///
/// Positions are relative to `start`; reads stop at `end` even when the inner
/// source continues. Seeking past the end is allowed and reads there yield
/// nothing.
///
/// The window must lie inside the inner source: `new` fails with
/// `UnexpectedEof` when `end` runs past the inner length, so the window's
/// length is always a length it can deliver.
#[derive(Debug)]
pub struct RangedSource<R> {
    inner: R,
    range: Range<u64>,
    pos: u64,
}

impl<R: Seek> RangedSource<R> {
    pub fn new(mut inner: R, range: Range<u64>) -> io::Result<Self> {
        if range.start > range.end {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid range {}..{}", range.start, range.end),
            ));
        }
        let available = inner.seek(SeekFrom::End(0))?;
        if range.end > available {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "range {}..{} runs past the end of a {available}-byte source",
                    range.start, range.end
                ),
            ));
        }
        inner.seek(SeekFrom::Start(range.start))?;
        Ok(Self {
            inner,
            range,
            pos: 0,
        })
    }
}

impl<R> RangedSource<R> {
    /// Length of the window.
    pub fn len(&self) -> u64 {
        self.range.end - self.range.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for RangedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len().saturating_sub(self.pos);
        if remaining == 0 {
            return Ok(0);
        }
        let to_read = remaining.min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..to_read])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for RangedSource<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = resolve_position(pos, self.pos, self.len())?;
        let absolute = self.range.start.checked_add(target).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek position overflows u64")
        })?;
        self.inner.seek(SeekFrom::Start(absolute))?;
        self.pos = target;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

impl<R: ReadSeekClose> ReadSeekClose for RangedSource<R> {
    fn close(&mut self) -> io::Result<()> {
        self.inner.close()
    }
}

/// Measure a source by seeking to its end, then rewind it to the start.
pub(crate) fn measure<S: Seek + ?Sized>(source: &mut S) -> io::Result<u64> {
    let size = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    Ok(size)
}
